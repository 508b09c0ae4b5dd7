use crate::domain::entry::LedgerEntry;
use crate::domain::value_objects::{BookId, BorrowerId, EntryId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Outcome of inserting an open entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The entry was committed.
    Inserted,
    /// An open entry for the same `(borrower, book)` pair already exists;
    /// nothing was written.
    DuplicateOpen,
}

/// Ledger Entry Store port - append-only record of circulation history.
///
/// Entries are created and closed exclusively by the circulation service
/// and never deleted. The store enforces, transactionally, that at most
/// one open entry exists per `(borrower, book)` pair.
#[async_trait]
pub trait LedgerEntryStore: Send + Sync {
    /// Insert an open entry.
    ///
    /// The uniqueness of open `(borrower, book)` pairs is checked
    /// atomically with the write; a concurrent duplicate commits at most
    /// once and every other attempt observes `DuplicateOpen`.
    async fn insert(&self, entry: LedgerEntry) -> Result<InsertOutcome>;

    /// Find the open entry for a `(borrower, book)` pair, if any.
    async fn find_open_by_borrower_and_book(
        &self,
        borrower_id: BorrowerId,
        book_id: BookId,
    ) -> Result<Option<LedgerEntry>>;

    /// Find an open entry by id, scoped to its owning borrower.
    ///
    /// A missing entry, a closed entry, and an entry owned by someone
    /// else are indistinguishable through this method.
    async fn find_open_by_id(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
    ) -> Result<Option<LedgerEntry>>;

    /// Close an entry: set `return_at`, only if the entry is still open
    /// and owned by `borrower_id`.
    ///
    /// The check and the write are one atomic operation; of two
    /// concurrent closes exactly one receives the entry, the other
    /// `None`. Returns the closed entry.
    async fn close(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
        return_at: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>>;

    /// All open entries with `due_at < now`, ordered by `due_at`
    /// ascending (oldest overdue first).
    ///
    /// Snapshot read; takes no lock and tolerates concurrent writers.
    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<LedgerEntry>>;
}
