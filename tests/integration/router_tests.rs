//! In-process router tests for authentication, authorization and input
//! validation

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{librarian_token, patron_token, send, valid_book};

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send("GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (status, body) = send("GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/search"].is_object());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    for (method, uri) in [
        ("GET", "/api/books"),
        ("GET", "/api/books/search?keyword=gatsby"),
        ("GET", "/api/users"),
        ("GET", "/api/auth/me"),
        ("POST", "/api/borrow/1/1"),
        ("GET", "/api/borrow/overdue"),
    ] {
        let (status, body) = send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "NotAuthenticated");
    }
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let (status, _) = send("GET", "/api/books", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patron_cannot_add_book() {
    let token = patron_token();
    let (status, body) = send(
        "POST",
        "/api/books",
        Some(&token),
        Some(valid_book().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_patron_cannot_modify_or_delete_book() {
    let token = patron_token();

    let (status, _) = send("PUT", "/api/books/1", Some(&token), Some(valid_book().to_string())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("DELETE", "/api/books/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patron_cannot_manage_users() {
    let token = patron_token();

    for (method, uri) in [("GET", "/api/users"), ("GET", "/api/users/2"), ("DELETE", "/api/users/3")] {
        let (status, _) = send(method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_patron_cannot_view_global_history() {
    let token = patron_token();

    let (status, _) = send("GET", "/api/borrow/history", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("GET", "/api/borrow/overdue", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patron_cannot_act_for_another_user() {
    // patron_token() belongs to user 2
    let token = patron_token();

    let (status, _) = send("POST", "/api/borrow/3/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("POST", "/api/borrow/return/3/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("GET", "/api/borrow/user/3", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_isbn_rejected() {
    let token = librarian_token();
    let mut book = valid_book();
    book["isbn"] = json!("12345");

    let (status, body) = send("POST", "/api/books", Some(&token), Some(book.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["fields"]["isbn"], "Invalid ISBN format");
}

#[tokio::test]
async fn test_future_publication_date_rejected() {
    let token = librarian_token();
    let mut book = valid_book();
    let tomorrow = Utc::now().date_naive() + Duration::days(2);
    book["publication_date"] = json!(tomorrow.format("%Y-%m-%d").to_string());
    book["title"] = json!("   ");

    let (status, body) = send("POST", "/api/books", Some(&token), Some(book.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["publication_date"].is_string());
    assert!(body["fields"]["title"].is_string());
}

#[tokio::test]
async fn test_missing_book_field_rejected() {
    let token = librarian_token();
    let body = json!({ "title": "Untitled" }).to_string();

    let (status, body) = send("POST", "/api/books", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (status, body) = send(
        "POST",
        "/api/auth/register",
        None,
        Some("{\"name\": \"Jane\",".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Malformed JSON request");
}

#[tokio::test]
async fn test_register_validation() {
    let invalid_email = json!({
        "name": "Jane Doe",
        "email": "not-an-email",
        "password": "Password123",
        "role": "PATRON"
    });
    let (status, body) = send("POST", "/api/auth/register", None, Some(invalid_email.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_string());

    let weak_password = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "password": "password",
        "role": "PATRON"
    });
    let (status, body) = send("POST", "/api/auth/register", None, Some(weak_password.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password"].is_string());

    let unknown_role = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "password": "Password123",
        "role": "ADMIN"
    });
    let (status, _) = send("POST", "/api/auth/register", None, Some(unknown_role.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_librarian_self_registration_disabled() {
    let librarian = json!({
        "name": "Head Librarian",
        "email": "head@example.com",
        "password": "Password123",
        "role": "LIBRARIAN"
    });

    let (status, body) = send("POST", "/api/auth/register", None, Some(librarian.to_string())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let body = json!({ "email": "", "password": "" }).to_string();
    let (status, body) = send("POST", "/api/auth/login", None, Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_string());
}

#[tokio::test]
async fn test_invalid_user_update_rejected() {
    let token = librarian_token();
    let body = json!({
        "name": "",
        "email": "jane@example.com",
        "role": "PATRON",
        "password": "short"
    })
    .to_string();

    let (status, body) = send("PUT", "/api/users/2", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["name"].is_string());
    assert!(body["fields"]["password"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_rejected() {
    let token = librarian_token();

    for (method, uri) in [
        ("GET", "/api/books/abc"),
        ("DELETE", "/api/users/abc"),
        ("POST", "/api/borrow/1/abc"),
        ("GET", "/api/borrow/user/abc"),
    ] {
        let (status, body) = send(method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["error"], "BadValue", "{} {}", method, uri);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_invalid_query_parameter_rejected() {
    let token = patron_token();
    let (status, body) = send("GET", "/api/books/search?keyword=x&page=x", Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_out_of_range_page_rejected() {
    let token = patron_token();
    let uri = format!("/api/books/search?keyword=x&page={}&size=10", i64::MAX);

    let (status, body) = send("GET", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["page"].is_string());
}

#[tokio::test]
async fn test_patron_with_invalid_book_is_forbidden() {
    let token = patron_token();
    let mut book = valid_book();
    book["isbn"] = json!("12345");
    book["title"] = json!("");

    let (status, _) = send("POST", "/api/books", Some(&token), Some(book.to_string())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send("PUT", "/api/books/1", Some(&token), Some(book.to_string())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let user = json!({ "name": "", "email": "bad", "role": "PATRON" }).to_string();
    let (status, _) = send("PUT", "/api/users/2", Some(&token), Some(user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
