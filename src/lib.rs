//! Book Lending Server
//!
//! A REST JSON backend for peer-to-peer book lending: users list books they
//! own, other users request rentals, owners approve them, and completed
//! rentals collect reviews and payments.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/token", post(api::auth::obtain_token))
        .route("/auth/token/refresh", post(api::auth::refresh_token))
        // Users
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/me",
            get(api::users::me)
                .put(api::users::update_me)
                .patch(api::users::update_me),
        )
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .patch(api::users::update_user)
                .delete(api::users::delete_user),
        )
        // Books
        .route(
            "/books",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route("/books/my_books", get(api::books::my_books))
        .route("/books/available", get(api::books::available_books))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .patch(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/books/:id/reviews", get(api::books::book_reviews))
        // Rentals
        .route(
            "/rentals",
            get(api::rentals::list_rentals).post(api::rentals::create_rental),
        )
        .route("/rentals/my_rentals", get(api::rentals::my_rentals))
        .route("/rentals/my_book_rentals", get(api::rentals::my_book_rentals))
        .route(
            "/rentals/:id",
            get(api::rentals::get_rental)
                .put(api::rentals::update_rental)
                .patch(api::rentals::update_rental)
                .delete(api::rentals::delete_rental),
        )
        .route("/rentals/:id/approve", post(api::rentals::approve_rental))
        .route("/rentals/:id/complete", post(api::rentals::complete_rental))
        .route("/rentals/:id/cancel", post(api::rentals::cancel_rental))
        // Reviews
        .route(
            "/reviews",
            get(api::reviews::list_reviews).post(api::reviews::create_review),
        )
        .route("/reviews/my_reviews", get(api::reviews::my_reviews))
        .route(
            "/reviews/:id",
            get(api::reviews::get_review)
                .put(api::reviews::update_review)
                .patch(api::reviews::update_review)
                .delete(api::reviews::delete_review),
        )
        // Payments
        .route(
            "/payments",
            get(api::payments::list_payments).post(api::payments::create_payment),
        )
        .route("/payments/my_payments", get(api::payments::my_payments))
        .route(
            "/payments/:id",
            get(api::payments::get_payment)
                .put(api::payments::update_payment)
                .patch(api::payments::update_payment)
                .delete(api::payments::delete_payment),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
