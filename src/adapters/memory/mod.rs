pub mod borrowers;
pub mod catalog;
pub mod clock;
pub mod ledger;

pub use borrowers::BorrowerDirectory;
pub use catalog::CatalogStore;
pub use clock::ManualClock;
pub use ledger::LedgerEntryStore;
