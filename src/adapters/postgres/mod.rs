pub mod catalog_store;
pub mod ledger_store;

pub use catalog_store::CatalogStore as PostgresCatalogStore;
pub use ledger_store::LedgerEntryStore as PostgresLedgerEntryStore;
