//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, payments, rentals, reviews, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Lending API",
        version = "1.0.0",
        description = "Peer-to-peer book lending REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::obtain_token,
        auth::refresh_token,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::me,
        users::update_me,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        books::book_reviews,
        books::my_books,
        books::available_books,
        // Rentals
        rentals::list_rentals,
        rentals::create_rental,
        rentals::get_rental,
        rentals::update_rental,
        rentals::delete_rental,
        rentals::my_rentals,
        rentals::my_book_rentals,
        rentals::approve_rental,
        rentals::complete_rental,
        rentals::cancel_rental,
        // Reviews
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::my_reviews,
        // Payments
        payments::list_payments,
        payments::create_payment,
        payments::get_payment,
        payments::update_payment,
        payments::delete_payment,
        payments::my_payments,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::RefreshRequest,
            auth::TokenResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::UserStatus,
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            // Books
            crate::models::book::BookStatus,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Rentals
            crate::models::rental::RentalStatus,
            crate::models::rental::Rental,
            crate::models::rental::CreateRental,
            crate::models::rental::UpdateRental,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            // Payments
            crate::models::payment::PaymentStatus,
            crate::models::payment::Payment,
            crate::models::payment::CreatePayment,
            crate::models::payment::UpdatePayment,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token issuance"),
        (name = "users", description = "User accounts and profiles"),
        (name = "books", description = "Book listings"),
        (name = "rentals", description = "Rental requests and workflow"),
        (name = "reviews", description = "Book reviews"),
        (name = "payments", description = "Rental payments")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
