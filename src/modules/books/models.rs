use serde::{Deserialize, Serialize};

/// A book record in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: u64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
    /// ISBN of the book
    pub isbn: String,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl Book {
    pub(crate) fn from_new(id: u64, new: NewBook) -> Self {
        Self {
            id,
            title: new.title,
            author: new.author,
            year: new.year,
            isbn: new.isbn,
        }
    }

    pub(crate) fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = isbn;
        }
    }
}
