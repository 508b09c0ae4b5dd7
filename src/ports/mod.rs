pub mod borrower_directory;
pub mod catalog_store;
pub mod clock;
pub mod ledger_store;

pub use borrower_directory::BorrowerDirectory;
pub use catalog_store::{Book, CatalogStore};
pub use clock::Clock;
pub use ledger_store::{InsertOutcome, LedgerEntryStore};
