//! Data models for the book lending service

pub mod book;
pub mod payment;
pub mod rental;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use payment::{Payment, PaymentStatus};
pub use rental::{Rental, RentalAction, RentalStatus};
pub use review::Review;
pub use user::{Role, User, UserClaims, UserStatus};
