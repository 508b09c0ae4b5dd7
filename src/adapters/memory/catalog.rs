use crate::domain::value_objects::BookId;
use crate::ports::catalog_store::{Book, CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory CatalogStore.
///
/// The conditional decrement and the capped increment run under the map
/// lock, giving the same atomicity contract as a conditional UPDATE.
/// Books are registered through `add_book`.
pub struct CatalogStore {
    books: Mutex<HashMap<BookId, Book>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// Register a book in the catalog.
    pub fn add_book(&self, book: Book) {
        self.books.lock().unwrap().insert(book.book_id, book);
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.books.lock().unwrap().get(&book_id).cloned())
    }

    async fn try_decrement_available(&self, book_id: BookId) -> Result<bool> {
        let mut books = self.books.lock().unwrap();
        match books.get_mut(&book_id) {
            Some(book) if book.available_copies > 0 => {
                book.available_copies -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_available(&self, book_id: BookId) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        if let Some(book) = books.get_mut(&book_id) {
            book.available_copies = (book.available_copies + 1).min(book.total_copies);
        }
        Ok(())
    }
}
