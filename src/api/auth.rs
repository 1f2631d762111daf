//! Token endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, services::users::TokenPair};

use super::Json;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh request
#[derive(Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Issued tokens
#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    /// Short-lived token for the Authorization header
    pub access: String,
    /// Longer-lived token accepted only by /auth/token/refresh
    pub refresh: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: pair.access,
            refresh: pair.refresh,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/token",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn obtain_token(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let (tokens, _user) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(tokens.into()))
}

/// Exchange a refresh token for a new pair
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = state.services.users.refresh(&request.refresh).await?;
    Ok(Json(tokens.into()))
}
