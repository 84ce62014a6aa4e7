//! Data models for the library server

pub mod book;
pub mod borrow;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use book::{Book, BookPage, BookQuery, BookRequest};
pub use borrow::BorrowRecord;
pub use user::{RegisterUser, Role, UpdateUser, User, UserClaims};
