//! Borrow/return service

use chrono::Utc;

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::borrow::BorrowRecord,
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    config: LoansConfig,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for a user
    pub async fn borrow_book(&self, user_id: i64, book_id: i64) -> AppResult<BorrowRecord> {
        tracing::info!("Attempting to borrow book with ID {} for user with ID {}", book_id, user_id);

        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let today = Utc::now().date_naive();
        let due_date = BorrowRecord::due_date_for(today, self.config.loan_period_days);

        let record = self
            .repository
            .borrows
            .borrow(user_id, book_id, today, due_date)
            .await
            .map_err(|e| {
                tracing::warn!("Borrow of book {} by user {} refused: {}", book_id, user_id, e);
                e
            })?;

        tracing::info!(record_id = record.id, %due_date, "Book with ID {} successfully borrowed by user with ID {}", book_id, user_id);
        Ok(record)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, user_id: i64, book_id: i64) -> AppResult<BorrowRecord> {
        tracing::info!("Attempting to return book with ID {} for user with ID {}", book_id, user_id);

        let today = Utc::now().date_naive();
        let record = self
            .repository
            .borrows
            .return_book(user_id, book_id, today)
            .await?;

        tracing::info!("Book with ID {} successfully returned by user with ID {}", book_id, user_id);
        Ok(record)
    }

    /// Borrow history of one user
    pub async fn user_history(&self, user_id: i64) -> AppResult<Vec<BorrowRecord>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.list_for_user(user_id).await
    }

    /// Complete borrow history
    pub async fn all_history(&self) -> AppResult<Vec<BorrowRecord>> {
        self.repository.borrows.list_all().await
    }

    /// Open records past their due date
    pub async fn overdue(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = self
            .repository
            .borrows
            .list_overdue(Utc::now().date_naive())
            .await?;
        tracing::info!("Found {} overdue borrow records", records.len());
        Ok(records)
    }
}
