//! API integration tests
//!
//! These run against a live server on localhost:8080 whose database has been
//! prepared with `book-lending-seed --users-only`.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const PASSWORD: &str = "password123";

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", prefix, nanos % 1_000_000_000_000)
}

async fn get_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/token", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send token request");

    assert_eq!(response.status(), StatusCode::OK, "login failed for {}", username);
    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access"].as_str().expect("No access token in response").to_string()
}

/// Register a fresh user with the given role and return (id, access token)
async fn register(client: &Client, prefix: &str, role: &str) -> (i64, String) {
    let username = unique(prefix);
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "username": username,
            "password": PASSWORD,
            "email": format!("{}@example.com", username),
            "role": role
        }))
        .send()
        .await
        .expect("Failed to register user");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse user");
    let id = body["id"].as_i64().expect("No user id");
    (id, get_token(client, &username, PASSWORD).await)
}

async fn send(
    client: &Client,
    method: reqwest::Method,
    path: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = client
        .request(method, format!("{}{}", BASE_URL, path))
        .bearer_auth(token);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_book(client: &Client, owner_token: &str, title: &str) -> i64 {
    let (status, body) = send(
        client,
        reqwest::Method::POST,
        "/books",
        owner_token,
        Some(json!({ "title": title, "author": "F. Scott Fitzgerald", "category": "Fiction" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "available");
    body["id"].as_i64().expect("No book id")
}

async fn request_rental(client: &Client, renter_token: &str, book_id: i64) -> i64 {
    let (status, body) = send(
        client,
        reqwest::Method::POST,
        "/rentals",
        renter_token,
        Some(json!({ "book": book_id, "start_date": "2030-01-01", "end_date": "2030-01-15" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    body["id"].as_i64().expect("No rental id")
}

async fn book_status(client: &Client, token: &str, book_id: i64) -> Value {
    let (_, body) = send(client, reqwest::Method::GET, &format!("/books/{}", book_id), token, None).await;
    body["status"].clone()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_token_pair_and_refresh() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/token", BASE_URL))
        .json(&json!({ "username": "admin", "password": "1234567890" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    let refresh = body["refresh"].as_str().expect("No refresh token");

    let response = client
        .post(format!("{}/auth/token/refresh", BASE_URL))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // A refresh token is not accepted as a bearer token
    let (status, _) = send(&client, reqwest::Method::GET, "/books", refresh, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/token", BASE_URL))
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_requests_rejected() {
    let client = Client::new();

    for path in ["/books", "/rentals", "/reviews", "/payments", "/users/me"] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_approve_then_complete() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;

    let book_id = create_book(&client, &owner, "The Great Gatsby").await;
    let rental_id = request_rental(&client, &renter, book_id).await;

    // Only the book owner (or an admin) may approve
    let (status, body) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/approve", rental_id),
        &renter,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, body) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/approve", rental_id),
        &owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(book_status(&client, &owner, book_id).await, "rented");

    // A second approval is a state error and changes nothing
    let (status, body) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/approve", rental_id),
        &owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidState");

    let (status, body) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/complete", rental_id),
        &renter,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(book_status(&client, &owner, book_id).await, "available");

    let (_, mine) = send(&client, reqwest::Method::GET, "/rentals/my_book_rentals", &owner, None).await;
    assert!(mine
        .as_array()
        .expect("rental list")
        .iter()
        .any(|r| r["id"].as_i64() == Some(rental_id)));
}

#[tokio::test]
#[ignore]
async fn test_cancel_pending_keeps_book_available() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;

    let book_id = create_book(&client, &owner, "Animal Farm").await;
    let rental_id = request_rental(&client, &renter, book_id).await;

    let (status, body) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/cancel", rental_id),
        &renter,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "canceled");
    assert_eq!(book_status(&client, &renter, book_id).await, "available");

    // Completing a canceled rental is rejected
    let (status, _) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/complete", rental_id),
        &owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_cancel_approved_frees_book() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;

    let book_id = create_book(&client, &owner, "1984").await;
    let rental_id = request_rental(&client, &renter, book_id).await;

    send(&client, reqwest::Method::POST, &format!("/rentals/{}/approve", rental_id), &owner, None).await;
    assert_eq!(book_status(&client, &owner, book_id).await, "rented");

    let (status, _) = send(
        &client,
        reqwest::Method::POST,
        &format!("/rentals/{}/cancel", rental_id),
        &owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book_status(&client, &owner, book_id).await, "available");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_period_updates_keep_period_valid() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;

    let book_id = create_book(&client, &owner, "Pride and Prejudice").await;
    let rental_id = request_rental(&client, &renter, book_id).await;
    let path = format!("/rentals/{}", rental_id);

    // Each change is valid on its own; applied together the rental would end before it starts
    let (later_start, earlier_end) = tokio::join!(
        send(&client, reqwest::Method::PATCH, &path, &renter, Some(json!({ "start_date": "2030-01-10" }))),
        send(&client, reqwest::Method::PATCH, &path, &owner, Some(json!({ "end_date": "2030-01-05" }))),
    );
    let mut statuses = [later_start.0, earlier_end.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let (_, rental) = send(&client, reqwest::Method::GET, &path, &renter, None).await;
    let start = rental["start_date"].as_str().expect("start_date");
    let end = rental["end_date"].as_str().expect("end_date");
    assert!(end >= start, "{} .. {}", start, end);

    let (status, body) = send(
        &client,
        reqwest::Method::PATCH,
        &path,
        &renter,
        Some(json!({ "end_date": "2029-12-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_deleting_approved_rental_leaves_book_status() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;

    let book_id = create_book(&client, &owner, "The Alchemist").await;
    let rental_id = request_rental(&client, &renter, book_id).await;
    send(&client, reqwest::Method::POST, &format!("/rentals/{}/approve", rental_id), &owner, None).await;

    let (status, _) = send(
        &client,
        reqwest::Method::DELETE,
        &format!("/rentals/{}", rental_id),
        &renter,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(book_status(&client, &owner, book_id).await, "rented");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_review_rejected() {
    let client = Client::new();
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, reader) = register(&client, "reader", "renter").await;

    let book_id = create_book(&client, &owner, "The Hobbit").await;

    let review = json!({ "book": book_id, "rating": 5, "comment": "Loved it" });
    let (status, _) = send(&client, reqwest::Method::POST, "/reviews", &reader, Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&client, reqwest::Method::POST, "/reviews", &reader, Some(review)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already reviewed this book.");

    let (status, _) = send(
        &client,
        reqwest::Method::POST,
        "/reviews",
        &owner,
        Some(json!({ "book": book_id, "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, reviews) = send(&client, reqwest::Method::GET, &format!("/books/{}/reviews", book_id), &owner, None).await;
    assert_eq!(reviews.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore]
async fn test_payment_visibility() {
    let client = Client::new();
    let admin = get_token(&client, "admin", "1234567890").await;
    let (_, owner) = register(&client, "owner", "owner").await;
    let (_, renter) = register(&client, "renter", "renter").await;
    let (_, stranger) = register(&client, "stranger", "renter").await;

    let book_id = create_book(&client, &owner, "Clean Code").await;
    let rental_id = request_rental(&client, &renter, book_id).await;

    // Only admins record payments
    let payment = json!({ "rental": rental_id, "amount": "5.00", "status": "completed", "transaction_id": "TR-12345" });
    let (status, _) = send(&client, reqwest::Method::POST, "/payments", &owner, Some(payment.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&client, reqwest::Method::POST, "/payments", &admin, Some(payment.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let payment_id = body["id"].as_i64().expect("No payment id");

    // One payment per rental
    let (status, _) = send(&client, reqwest::Method::POST, "/payments", &admin, Some(payment)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let contains = |list: &Value| {
        list.as_array()
            .expect("payment list")
            .iter()
            .any(|p| p["id"].as_i64() == Some(payment_id))
    };

    let (_, list) = send(&client, reqwest::Method::GET, "/payments", &renter, None).await;
    assert!(contains(&list));
    let (_, list) = send(&client, reqwest::Method::GET, "/payments", &owner, None).await;
    assert!(contains(&list));
    let (_, list) = send(&client, reqwest::Method::GET, "/payments", &admin, None).await;
    assert!(contains(&list));
    let (_, list) = send(&client, reqwest::Method::GET, "/payments", &stranger, None).await;
    assert!(!contains(&list));

    let (_, list) = send(&client, reqwest::Method::GET, "/payments/my_payments", &renter, None).await;
    assert!(contains(&list));
    let (_, list) = send(&client, reqwest::Method::GET, "/payments/my_payments", &owner, None).await;
    assert!(!contains(&list));

    // Retrieval uses the same scope as the listing
    for (token, expected) in [
        (&renter, StatusCode::OK),
        (&owner, StatusCode::OK),
        (&admin, StatusCode::OK),
        (&stranger, StatusCode::NOT_FOUND),
    ] {
        let (status, body) = send(
            &client,
            reqwest::Method::GET,
            &format!("/payments/{}", payment_id),
            token,
            None,
        )
        .await;
        assert_eq!(status, expected);
        if expected == StatusCode::OK {
            assert_eq!(body["rental"].as_i64(), Some(rental_id));
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_profile_cannot_change_role() {
    let client = Client::new();
    let (id, viewer) = register(&client, "viewer", "viewer").await;

    let (status, body) = send(
        &client,
        reqwest::Method::PATCH,
        "/users/me",
        &viewer,
        Some(json!({ "first_name": "Vera", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(body["first_name"], "Vera");
    assert_eq!(body["role"], "viewer");

    let (status, _) = send(&client, reqwest::Method::GET, "/users", &viewer, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
