use crate::domain::value_objects::{BookId, Isbn};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Catalog record for one book title.
///
/// Invariant, maintained jointly by the store and the circulation service:
/// `0 <= available_copies <= total_copies` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub book_id: BookId,
    /// Globally unique ISBN-13.
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

/// Catalog Store port - durable record of books and their copy counts.
///
/// The circulation service is the only writer of `available_copies`, and
/// it writes exclusively through the two conditional operations below.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a book by id.
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;

    /// Take one copy off the shelf if any is available.
    ///
    /// Must execute as a single atomic compare-and-decrement guarded by
    /// `available_copies > 0`. Returns `true` when a copy was taken,
    /// `false` when none was available (or the book does not exist).
    /// Two concurrent calls with one copy left must yield exactly one
    /// `true`.
    async fn try_decrement_available(&self, book_id: BookId) -> Result<bool>;

    /// Put one copy back on the shelf.
    ///
    /// Atomic increment, capped at `total_copies`. The cap defends
    /// against corrupted bookkeeping and never triggers under correct
    /// operation.
    async fn increment_available(&self, book_id: BookId) -> Result<()>;
}
