use thiserror::Error;

/// Circulation service errors.
///
/// The first five variants are expected, recoverable-by-caller outcomes
/// (the NotFound / Conflict taxonomy). The wrapped-source variants are
/// opaque infrastructure failures; the ledger does not retry them.
#[derive(Debug, Error)]
pub enum CirculationError {
    /// Referenced book does not exist.
    #[error("Book not found")]
    BookNotFound,

    /// No open entry with that id is owned by the acting borrower.
    /// Missing, already returned, and foreign-owned entries collapse
    /// here so existence is not leaked to non-owners.
    #[error("Ledger entry not found")]
    EntryNotFound,

    /// The borrower does not resolve to an active identity.
    #[error("Borrower is not active")]
    BorrowerInactive,

    /// Every copy is currently on loan.
    #[error("No copies available")]
    NoCopiesAvailable,

    /// The borrower already holds an open loan of this book.
    #[error("Borrower already has this book checked out")]
    AlreadyCheckedOut,

    /// Catalog store failure.
    #[error("Catalog store error")]
    CatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Ledger entry store failure.
    #[error("Ledger entry store error")]
    LedgerError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Borrower directory failure.
    #[error("Borrower directory error")]
    DirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, CirculationError>;
