//! Book (catalog entry) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{not_blank, past_or_present, ISBN_RE};

/// Book as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub genre: String,
    pub available: bool,
}

/// Create or full-update request for a book.
///
/// Availability is not part of the request: new books start available and
/// only borrowing or returning changes it.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookRequest {
    /// Title of the book
    #[validate(custom(function = "not_blank"), length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,
    /// Author of the book
    #[validate(custom(function = "not_blank"), length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: String,
    /// ISBN-10 or ISBN-13, digits only
    #[validate(regex(path = *ISBN_RE, message = "Invalid ISBN format"))]
    pub isbn: String,
    /// Publication date (YYYY-MM-DD)
    #[validate(custom(function = "past_or_present"))]
    pub publication_date: NaiveDate,
    /// Genre of the book
    #[validate(custom(function = "not_blank"), length(max = 100, message = "Genre must be at most 100 characters"))]
    pub genre: String,
}

/// Book search parameters
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Matched against title, author, ISBN and genre
    pub keyword: Option<String>,
    /// Page number, starting at 0
    #[validate(range(max = 1_000_000, message = "Page must be at most 1000000"))]
    pub page: Option<i64>,
    /// Page size (1-100)
    pub size: Option<i64>,
}

impl BookQuery {
    pub const DEFAULT_SIZE: i64 = 10;
    pub const MAX_SIZE: i64 = 100;
    pub const MAX_PAGE: i64 = 1_000_000;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).clamp(0, Self::MAX_PAGE)
    }

    pub fn size(&self) -> i64 {
        self.size.unwrap_or(Self::DEFAULT_SIZE).clamp(1, Self::MAX_SIZE)
    }

    /// Trimmed keyword, `None` when blank
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// One page of books
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    pub items: Vec<Book>,
    /// Total number of matching books
    pub total: i64,
    /// Current page (0-based)
    pub page: i64,
    /// Page size
    pub size: i64,
    pub total_pages: i64,
}

impl BookPage {
    pub fn new(items: Vec<Book>, total: i64, page: i64, size: i64) -> Self {
        let total_pages = if size > 0 { (total + size - 1) / size } else { 0 };
        Self {
            items,
            total,
            page,
            size,
            total_pages,
        }
    }
}
