//! In-memory book collection.
//!
//! Every operation is a linear scan over an insertion-ordered `Vec`. The lock
//! only spans a single operation; callers get no isolation across calls.

use parking_lot::RwLock;
use thiserror::Error;

use super::models::{Book, BookPatch, NewBook};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookStoreError {
    #[error("Book not found")]
    NotFound(u64),
}

impl From<BookStoreError> for bookshelf_http::error::AppError {
    fn from(err: BookStoreError) -> Self {
        bookshelf_http::error::AppError::not_found(err.to_string())
    }
}

#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the given books in order
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }

    /// Store with the three catalogue books the service starts with
    pub fn seeded() -> Self {
        Self::with_books(vec![
            Book {
                id: 1,
                title: "Python Programming".to_string(),
                author: "John Doe".to_string(),
                year: 2023,
                isbn: "978-0123456789".to_string(),
            },
            Book {
                id: 2,
                title: "Web Development".to_string(),
                author: "Jane Smith".to_string(),
                year: 2024,
                isbn: "978-0987654321".to_string(),
            },
            Book {
                id: 3,
                title: "Data Science".to_string(),
                author: "Bob Johnson".to_string(),
                year: 2023,
                isbn: "978-1122334455".to_string(),
            },
        ])
    }

    pub fn list(&self) -> Vec<Book> {
        self.books.read().clone()
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }

    pub fn get(&self, id: u64) -> Result<Book, BookStoreError> {
        self.books
            .read()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(BookStoreError::NotFound(id))
    }

    /// Append a book under `max(id) + 1`, or 1 when empty
    pub fn create(&self, new: NewBook) -> Book {
        let mut books = self.books.write();
        let id = books.iter().map(|book| book.id).max().map_or(1, |max| max + 1);
        let book = Book::from_new(id, new);
        books.push(book.clone());
        book
    }

    pub fn update(&self, id: u64, patch: BookPatch) -> Result<Book, BookStoreError> {
        let mut books = self.books.write();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(BookStoreError::NotFound(id))?;
        book.apply(patch);
        Ok(book.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), BookStoreError> {
        let mut books = self.books.write();
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(BookStoreError::NotFound(id))?;
        books.remove(index);
        Ok(())
    }
}
