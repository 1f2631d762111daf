//! Business logic services

pub mod books;
pub mod payments;
pub mod rentals;
pub mod reviews;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub rentals: rentals::RentalsService,
    pub reviews: reviews::ReviewsService,
    pub payments: payments::PaymentsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            rentals: rentals::RentalsService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            payments: payments::PaymentsService::new(repository.clone()),
            repository,
        }
    }
}
