//! End-to-end tests against a running server
//!
//! Start the server with the `[bootstrap]` librarian from
//! `config/default.toml` enabled, then run `cargo test -- --ignored`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";
const LIBRARIAN_EMAIL: &str = "librarian@example.com";
const LIBRARIAN_PASSWORD: &str = "ChangeMe123";

/// Suffix that keeps emails and ISBNs unique across runs
fn unique() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    (nanos % 10_000_000_000) as u64
}

fn unique_isbn() -> String {
    format!("978{:010}", unique())
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn librarian_token(client: &Client) -> String {
    login(client, LIBRARIAN_EMAIL, LIBRARIAN_PASSWORD).await
}

/// Register a patron and return (id, token)
async fn register_patron(client: &Client) -> (i64, String) {
    let email = format!("patron{}@example.com", unique());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test Patron",
            "email": email,
            "password": "Password123",
            "role": "PATRON",
            "contact_info": "+1-555-0100"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.get("password").is_none());

    let id = body["id"].as_i64().expect("No id in response");
    (id, login(client, &email, "Password123").await)
}

async fn create_book(client: &Client, token: &str, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Integration Testing in Practice",
            "author": "Jane Tester",
            "isbn": isbn,
            "publication_date": "2020-01-15",
            "genre": "Software"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_and_readiness() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": LIBRARIAN_EMAIL, "password": "WrongPassword1" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_register_and_me() {
    let client = Client::new();
    let (id, token) = register_patron(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], id);
    assert_eq!(body["role"], "PATRON");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Impostor",
            "email": LIBRARIAN_EMAIL.to_uppercase(),
            "password": "Password123",
            "role": "PATRON"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let isbn = unique_isbn();

    let book = create_book(&client, &token, &isbn).await;
    let id = book["id"].as_i64().expect("No id in response");
    assert_eq!(book["available"], true);

    // Same ISBN again
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Another Title",
            "author": "Someone Else",
            "isbn": isbn,
            "publication_date": "2019-05-01",
            "genre": "Software"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Case-insensitive search
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .bearer_auth(&token)
        .query(&[("keyword", isbn.as_str()), ("page", "0"), ("size", "5")])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let page: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], id);

    // Update
    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Integration Testing in Practice, 2nd Edition",
            "author": "Jane Tester",
            "isbn": isbn,
            "publication_date": "2022-03-01",
            "genre": "Software"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["publication_date"], "2022-03-01");

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;
    let (patron_id, patron) = register_patron(&client).await;

    let book = create_book(&client, &librarian, &unique_isbn()).await;
    let book_id = book["id"].as_i64().expect("No id in response");

    // Borrow
    let response = client
        .post(format!("{}/borrow/{}/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&patron)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: Value = response.json().await.expect("Failed to parse response");
    assert!(record["return_date"].is_null());
    assert_eq!(record["overdue"], false);

    // Already on loan
    let response = client
        .post(format!("{}/borrow/{}/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&librarian)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BookNotAvailable");

    // Borrowed books and their borrowers cannot be deleted
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&librarian)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, patron_id))
        .bearer_auth(&librarian)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Return
    let response = client
        .post(format!("{}/borrow/return/{}/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&patron)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let record: Value = response.json().await.expect("Failed to parse response");
    assert!(record["return_date"].is_string());

    // Nothing left to return
    let response = client
        .post(format!("{}/borrow/return/{}/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&patron)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // History
    let response = client
        .get(format!("{}/borrow/user/{}", BASE_URL, patron_id))
        .bearer_auth(&patron)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let history: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(history.as_array().map(Vec::len), Some(1));

    let response = client
        .get(format!("{}/borrow/overdue", BASE_URL))
        .bearer_auth(&librarian)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_user_or_book() {
    let client = Client::new();
    let token = librarian_token(&client).await;

    let response = client
        .post(format!("{}/borrow/{}/{}", BASE_URL, i64::MAX, 1))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (patron_id, _) = register_patron(&client).await;
    let response = client
        .post(format!("{}/borrow/{}/{}", BASE_URL, patron_id, i64::MAX))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
