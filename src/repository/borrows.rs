//! Borrow records repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowRecord, BORROW_COLUMNS},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book: lock the book row, check availability, open a record and
    /// mark the book unavailable, all in one transaction.
    pub async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let available: bool = sqlx::query_scalar("SELECT available FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", book_id)))?;

        if !available {
            return Err(AppError::Unavailable(
                "Book is not available for borrowing".to_string(),
            ));
        }

        sqlx::query("UPDATE books SET available = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            INSERT INTO borrow_records (user_id, book_id, borrow_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BORROW_COLUMNS
        ))
        .bind(user_id)
        .bind(book_id)
        .bind(borrow_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // Open-record index: the book was borrowed by a concurrent transaction
            match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Unavailable(
                    "Book is not available for borrowing".to_string(),
                ),
                other => AppError::Database(other),
            }
        })?;

        tx.commit().await?;

        Ok(record)
    }

    /// Close the open record for this user and book and make the book available again
    pub async fn return_book(
        &self,
        user_id: i64,
        book_id: i64,
        return_date: NaiveDate,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let open_id: i64 = sqlx::query_scalar(
            r#"
            SELECT id FROM borrow_records
            WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No active borrow record found for this user and book".to_string())
        })?;

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            "UPDATE borrow_records SET return_date = $1 WHERE id = $2 RETURNING {}",
            BORROW_COLUMNS
        ))
        .bind(return_date)
        .bind(open_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available = TRUE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// All records for a user, newest first
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {} FROM borrow_records WHERE user_id = $1 ORDER BY borrow_date DESC, id DESC",
            BORROW_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Complete borrow history
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(&format!(
            "SELECT {} FROM borrow_records ORDER BY borrow_date DESC, id DESC",
            BORROW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Open records whose due date is before `today`
    pub async fn list_overdue(&self, today: NaiveDate) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            SELECT {} FROM borrow_records
            WHERE return_date IS NULL AND due_date < $1
            ORDER BY due_date, id
            "#,
            BORROW_COLUMNS
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
