//! Borrow record model

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Columns selected for every borrow record query, including the derived overdue flag
pub const BORROW_COLUMNS: &str = "id, user_id, book_id, borrow_date, due_date, return_date, \
     (return_date IS NULL AND due_date < CURRENT_DATE) AS overdue";

/// Borrow record linking a user and a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    /// ID of the user who borrowed the book
    pub user_id: i64,
    /// ID of the borrowed book
    pub book_id: i64,
    pub borrow_date: NaiveDate,
    /// Date by which the book must be returned
    pub due_date: NaiveDate,
    /// Set once the book is returned
    pub return_date: Option<NaiveDate>,
    /// Still open and past its due date
    pub overdue: bool,
}

impl BorrowRecord {
    /// Due date for a loan starting on `borrow_date`
    pub fn due_date_for(borrow_date: NaiveDate, loan_period_days: i64) -> NaiveDate {
        borrow_date + Duration::days(loan_period_days)
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}
