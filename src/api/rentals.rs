//! Rental endpoints and workflow actions

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::rental::{CreateRental, Rental, RentalAction, UpdateRental},
};

use super::{AuthenticatedUser, Json, Path};

/// List all rentals
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All rentals", body = Vec<Rental>)
    )
)]
pub async fn list_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Rental>>> {
    Ok(Json(state.services.rentals.list_rentals().await?))
}

/// Request a rental as the caller
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = CreateRental,
    responses(
        (status = 201, description = "Rental requested", body = Rental),
        (status = 400, description = "Invalid period or unknown book")
    )
)]
pub async fn create_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(rental): Json<CreateRental>,
) -> AppResult<(StatusCode, Json<Rental>)> {
    let created = state.services.rentals.request_rental(&claims, rental).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get rental details
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Rental details", body = Rental),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn get_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    Ok(Json(state.services.rentals.get_rental(id).await?))
}

/// Change the rental period (renter, book owner or admin)
#[utoipa::path(
    put,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    request_body = UpdateRental,
    responses(
        (status = 200, description = "Rental updated", body = Rental),
        (status = 403, description = "Not a party to this rental"),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn update_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateRental>,
) -> AppResult<Json<Rental>> {
    Ok(Json(state.services.rentals.update_rental(&claims, id, update).await?))
}

/// Delete a rental (renter, book owner or admin)
#[utoipa::path(
    delete,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 204, description = "Rental deleted"),
        (status = 403, description = "Not a party to this rental"),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn delete_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.rentals.delete_rental(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rentals requested by the caller
#[utoipa::path(
    get,
    path = "/rentals/my_rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's rentals", body = Vec<Rental>)
    )
)]
pub async fn my_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Rental>>> {
    Ok(Json(state.services.rentals.my_rentals(&claims).await?))
}

/// Rentals on the caller's books
#[utoipa::path(
    get,
    path = "/rentals/my_book_rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rentals on caller's books", body = Vec<Rental>)
    )
)]
pub async fn my_book_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Rental>>> {
    Ok(Json(state.services.rentals.my_book_rentals(&claims).await?))
}

/// Approve a pending rental (book owner or admin)
#[utoipa::path(
    post,
    path = "/rentals/{id}/approve",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Rental approved, book rented", body = Rental),
        (status = 400, description = "Rental is not pending", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner of this book", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn approve_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    let rental = state
        .services
        .rentals
        .apply_action(&claims, id, RentalAction::Approve)
        .await?;
    Ok(Json(rental))
}

/// Complete an approved rental (book owner, renter or admin)
#[utoipa::path(
    post,
    path = "/rentals/{id}/complete",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Rental completed, book available", body = Rental),
        (status = 400, description = "Rental is not approved", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a party to this rental", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn complete_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    let rental = state
        .services
        .rentals
        .apply_action(&claims, id, RentalAction::Complete)
        .await?;
    Ok(Json(rental))
}

/// Cancel a pending or approved rental (renter, book owner or admin)
#[utoipa::path(
    post,
    path = "/rentals/{id}/cancel",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Rental canceled", body = Rental),
        (status = 400, description = "Rental can no longer be canceled", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a party to this rental", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn cancel_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    let rental = state
        .services
        .rentals
        .apply_action(&claims, id, RentalAction::Cancel)
        .await?;
    Ok(Json(rental))
}
