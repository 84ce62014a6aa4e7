//! Borrow and return endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{error::AppResult, models::borrow::BorrowRecord, AppState};

use super::{ApiPath, AuthenticatedUser};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow/{user_id}/{book_id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "Borrowing user ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Book is not available", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed to borrow for this user"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((user_id, book_id)): ApiPath<(i64, i64)>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    claims.require_self_or_librarian(user_id)?;

    let record = state.services.borrows.borrow_book(user_id, book_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrow/return/{user_id}/{book_id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "Borrowing user ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 403, description = "Not allowed to return for this user"),
        (status = 404, description = "No active borrow record", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((user_id, book_id)): ApiPath<(i64, i64)>,
) -> AppResult<Json<BorrowRecord>> {
    claims.require_self_or_librarian(user_id)?;

    let record = state.services.borrows.return_book(user_id, book_id).await?;
    Ok(Json(record))
}

/// Borrow history of a user
#[utoipa::path(
    get,
    path = "/borrow/user/{user_id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User borrow records", body = Vec<BorrowRecord>),
        (status = 403, description = "Not allowed to view this user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_borrow_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(user_id): ApiPath<i64>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_self_or_librarian(user_id)?;

    let records = state.services.borrows.user_history(user_id).await?;
    Ok(Json(records))
}

/// Complete borrow history
#[utoipa::path(
    get,
    path = "/borrow/history",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowRecord>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn borrow_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_librarian()?;

    let records = state.services.borrows.all_history().await?;
    Ok(Json(records))
}

/// Open borrow records past their due date
#[utoipa::path(
    get,
    path = "/borrow/overdue",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue borrow records", body = Vec<BorrowRecord>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn overdue_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_librarian()?;

    let records = state.services.borrows.overdue().await?;
    Ok(Json(records))
}
