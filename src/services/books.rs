//! Catalog (books) service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPage, BookQuery, BookRequest},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book; the ISBN must not be in use
    pub async fn add_book(&self, book: BookRequest) -> AppResult<Book> {
        tracing::info!("Attempting to add book with ISBN: {}", book.isbn);

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            tracing::warn!("Book with ISBN {} already exists", book.isbn);
            return Err(AppError::Conflict(format!(
                "A book with the ISBN {} already exists.",
                book.isbn
            )));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.id, "Successfully added book with ISBN: {}", created.isbn);
        Ok(created)
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// List every book
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        let books = self.repository.books.list().await?;
        tracing::debug!("Retrieved {} books", books.len());
        Ok(books)
    }

    /// Keyword search with pagination; a blank keyword returns all books
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let (page, size) = (query.page(), query.size());
        let keyword = query.keyword();

        tracing::info!(
            "Searching for books with keyword: {:?} on page {} with size {}",
            keyword,
            page,
            size
        );

        let (books, total) = self.repository.books.search(keyword, page, size).await?;
        tracing::debug!("Found {} books for keyword: {:?}", total, keyword);

        Ok(BookPage::new(books, total, page, size))
    }

    /// Replace a book's details
    pub async fn update_book(&self, id: i64, book: BookRequest) -> AppResult<Book> {
        tracing::info!("Attempting to update book with ID: {}", id);

        self.repository.books.get_by_id(id).await?;

        if self.repository.books.isbn_exists(&book.isbn, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "A book with the ISBN {} already exists.",
                book.isbn
            )));
        }

        let updated = self.repository.books.update(id, &book).await?;
        tracing::info!("Successfully updated book with ID: {}", id);
        Ok(updated)
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        tracing::info!("Attempting to delete book with ID: {}", id);
        self.repository.books.delete(id).await?;
        tracing::info!("Successfully deleted book with ID: {}", id);
        Ok(())
    }
}
