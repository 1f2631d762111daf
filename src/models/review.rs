//! Review model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Name of the unique (book, user) constraint on reviews
pub const REVIEW_UNIQUE_CONSTRAINT: &str = "reviews_book_user_unique";

pub const DUPLICATE_REVIEW_MESSAGE: &str = "You have already reviewed this book.";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    #[serde(rename = "book")]
    pub book_id: i32,
    pub book_title: String,
    #[serde(rename = "user")]
    pub user_id: i32,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Create review request. The author is always the caller.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[serde(rename = "book")]
    pub book_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

/// Update review request. Book and author are fixed once created.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    pub comment: Option<String>,
}
