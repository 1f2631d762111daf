//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "book_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Rented,
    Unavailable,
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

/// Book as returned by the API, with the owner's username resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    #[serde(rename = "owner")]
    pub owner_id: i32,
    pub owner_name: String,
    pub category: Option<String>,
    pub status: BookStatus,
}

/// Create book request. The owner is always the caller.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}

/// Update book request. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}
