//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookRequest},
};

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_date, genre, available";

/// Escape LIKE wildcards so the keyword is matched literally
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn duplicate_isbn(isbn: &str) -> String {
    format!("A book with the ISBN {} already exists.", isbn)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", id)))
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Check if ISBN already exists, optionally ignoring one book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search books by keyword over title, author, ISBN and genre, with pagination.
    /// A `None` keyword matches every book.
    pub async fn search(&self, keyword: Option<&str>, page: i64, size: i64) -> AppResult<(Vec<Book>, i64)> {
        let offset = page
            .checked_mul(size)
            .ok_or_else(|| AppError::BadRequest(format!("Page {} is out of range", page)))?;
        let pattern = keyword.map(like_pattern);

        let where_clause = if pattern.is_some() {
            r#"
            WHERE LOWER(title) LIKE $1
               OR LOWER(author) LIKE $1
               OR LOWER(isbn) LIKE $1
               OR LOWER(genre) LIKE $1
            "#
        } else {
            ""
        };

        let count_query = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref p) = pattern {
            count_builder = count_builder.bind(p);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let limit_params = if pattern.is_some() { "$2 OFFSET $3" } else { "$1 OFFSET $2" };
        let select_query = format!(
            "SELECT {} FROM books {} ORDER BY id LIMIT {}",
            BOOK_COLUMNS, where_clause, limit_params
        );
        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        if let Some(ref p) = pattern {
            select_builder = select_builder.bind(p);
        }
        let books = select_builder
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Insert a new book, always available
    pub async fn create(&self, book: &BookRequest) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, isbn, publication_date, genre, available)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .bind(&book.genre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, duplicate_isbn(&book.isbn)))
    }

    /// Replace the descriptive fields of a book; availability is left to borrow/return
    pub async fn update(&self, id: i64, book: &BookRequest) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = $1,
                author = $2,
                isbn = $3,
                publication_date = $4,
                genre = $5
            WHERE id = $6
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .bind(&book.genre)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, duplicate_isbn(&book.isbn)))?
        .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", id)))
    }

    /// Whether the book currently has an open borrow record
    pub async fn is_borrowed(&self, id: i64) -> AppResult<bool> {
        let borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_records WHERE book_id = $1 AND return_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(borrowed)
    }

    /// Delete a book; refused while it is borrowed
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.is_borrowed(id).await? {
            return Err(AppError::Conflict(format!(
                "Book with ID {} is currently borrowed",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with ID {} not found", id)));
        }

        Ok(())
    }
}
