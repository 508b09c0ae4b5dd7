use crate::domain::entry::LedgerEntry;
use crate::domain::value_objects::{BookId, BorrowerId, EntryId};
use crate::ports::ledger_store::{InsertOutcome, LedgerEntryStore as LedgerEntryStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory LedgerEntryStore.
///
/// The open-pair uniqueness check and the conditional close run under
/// the map lock, matching the transactional guarantees of the Postgres
/// adapter. Entries are append-only; closing mutates `return_at` once.
pub struct LedgerEntryStore {
    entries: Mutex<HashMap<EntryId, LedgerEntry>>,
}

impl LedgerEntryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LedgerEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerEntryStoreTrait for LedgerEntryStore {
    async fn insert(&self, entry: LedgerEntry) -> Result<InsertOutcome> {
        let mut entries = self.entries.lock().unwrap();

        let duplicate = entries.values().any(|e| {
            e.is_open() && e.borrower_id == entry.borrower_id && e.book_id == entry.book_id
        });
        if duplicate {
            return Ok(InsertOutcome::DuplicateOpen);
        }

        entries.insert(entry.entry_id, entry);
        Ok(InsertOutcome::Inserted)
    }

    async fn find_open_by_borrower_and_book(
        &self,
        borrower_id: BorrowerId,
        book_id: BookId,
    ) -> Result<Option<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .find(|e| e.is_open() && e.borrower_id == borrower_id && e.book_id == book_id)
            .cloned())
    }

    async fn find_open_by_id(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
    ) -> Result<Option<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(&entry_id)
            .filter(|e| e.is_open() && e.borrower_id == borrower_id)
            .cloned())
    }

    async fn close(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
        return_at: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>> {
        let mut entries = self.entries.lock().unwrap();

        let Some(entry) = entries.get_mut(&entry_id) else {
            return Ok(None);
        };
        if !entry.is_open() || entry.borrower_id != borrower_id {
            return Ok(None);
        }

        let closed = entry.clone().close(return_at).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("close raced on open entry: {:?}", e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;
        *entry = closed.clone();

        Ok(Some(closed))
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut overdue: Vec<LedgerEntry> = entries
            .values()
            .filter(|e| e.is_overdue(now))
            .cloned()
            .collect();
        overdue.sort_by_key(|e| e.due_at);
        Ok(overdue)
    }
}
