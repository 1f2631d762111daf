//! Book endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        review::Review,
    },
};

use super::{AuthenticatedUser, Json, Path};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.books.list_books().await?))
}

/// List a book for rental; the caller becomes its owner
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create_book(&claims, book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book details
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.services.books.get_book(id).await?))
}

/// Update a book (owner or admin)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Not the owner of this book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update_book(&claims, id, book).await?;
    Ok(Json(updated))
}

/// Delete a book (owner or admin)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Not the owner of this book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reviews of a book
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Reviews for the book", body = Vec<Review>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_reviews(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.services.reviews.book_reviews(id).await?))
}

/// Books owned by the caller
#[utoipa::path(
    get,
    path = "/books/my_books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's books", body = Vec<Book>)
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.books.my_books(&claims).await?))
}

/// Books currently available for rental
#[utoipa::path(
    get,
    path = "/books/available",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available books", body = Vec<Book>)
    )
)]
pub async fn available_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.books.available_books().await?))
}
