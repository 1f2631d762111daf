//! Payment endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::payment::{CreatePayment, Payment, UpdatePayment},
};

use super::{AuthenticatedUser, Json, Path};

/// Payments visible to the caller
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All payments for an admin, otherwise those on the caller's rentals or books", body = Vec<Payment>)
    )
)]
pub async fn list_payments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(state.services.payments.list_payments(&claims).await?))
}

/// Record a payment (admin only)
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    request_body = CreatePayment,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Invalid amount or rental already paid"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payment): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let created = state.services.payments.create_payment(&claims, payment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a payment visible to the caller
#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 404, description = "Payment not found or not visible")
    )
)]
pub async fn get_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Payment>> {
    Ok(Json(state.services.payments.get_payment(&claims, id).await?))
}

/// Update a payment (admin only)
#[utoipa::path(
    put,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Payment ID")
    ),
    request_body = UpdatePayment,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn update_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdatePayment>,
) -> AppResult<Json<Payment>> {
    Ok(Json(state.services.payments.update_payment(&claims, id, update).await?))
}

/// Delete a payment (admin only)
#[utoipa::path(
    delete,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Payment ID")
    ),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn delete_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.payments.delete_payment(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Payments on rentals the caller made
#[utoipa::path(
    get,
    path = "/payments/my_payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's payments as renter", body = Vec<Payment>)
    )
)]
pub async fn my_payments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(state.services.payments.my_payments(&claims).await?))
}
