//! Review endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, UpdateReview},
};

use super::{AuthenticatedUser, Json, Path};

/// List all reviews
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reviews", body = Vec<Review>)
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.services.reviews.list_reviews().await?))
}

/// Review a book as the caller
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid rating or book already reviewed", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(review): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let created = state.services.reviews.create_review(&claims, review).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a review
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.services.reviews.get_review(id).await?))
}

/// Update a review (author or admin)
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Review ID")
    ),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 403, description = "Not the author of this review"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.services.reviews.update_review(&claims, id, update).await?))
}

/// Delete a review (author or admin)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author of this review"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reviews written by the caller
#[utoipa::path(
    get,
    path = "/reviews/my_reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reviews", body = Vec<Review>)
    )
)]
pub async fn my_reviews(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.services.reviews.my_reviews(&claims).await?))
}
