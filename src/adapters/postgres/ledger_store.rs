use crate::domain::entry::LedgerEntry;
use crate::domain::value_objects::{BookId, BorrowerId, EntryId};
use crate::ports::ledger_store::{InsertOutcome, LedgerEntryStore as LedgerEntryStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_entry(row: &PgRow) -> LedgerEntry {
    LedgerEntry {
        entry_id: EntryId::from_uuid(row.get("entry_id")),
        borrower_id: BorrowerId::from_uuid(row.get("borrower_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        checkout_at: row.get("checkout_at"),
        due_at: row.get("due_at"),
        return_at: row.get("return_at"),
    }
}

/// PostgreSQL LedgerEntryStore.
///
/// The one-open-entry-per-pair invariant is carried by a partial unique
/// index on `(borrower_id, book_id) WHERE return_at IS NULL`; a losing
/// concurrent insert surfaces as a unique violation and is reported as
/// `DuplicateOpen`. The close is a conditional UPDATE with RETURNING, so
/// a double return resolves at the row level.
pub struct LedgerEntryStore {
    pool: PgPool,
}

impl LedgerEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerEntryStoreTrait for LedgerEntryStore {
    async fn insert(&self, entry: LedgerEntry) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                entry_id,
                borrower_id,
                book_id,
                checkout_at,
                due_at,
                return_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.entry_id.value())
        .bind(entry.borrower_id.value())
        .bind(entry.book_id.value())
        .bind(entry.checkout_at)
        .bind(entry.due_at)
        .bind(entry.return_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateOpen)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn find_open_by_borrower_and_book(
        &self,
        borrower_id: BorrowerId,
        book_id: BookId,
    ) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(
            r#"
            SELECT entry_id, borrower_id, book_id, checkout_at, due_at, return_at
            FROM ledger_entries
            WHERE borrower_id = $1 AND book_id = $2 AND return_at IS NULL
            "#,
        )
        .bind(borrower_id.value())
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_entry))
    }

    async fn find_open_by_id(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
    ) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(
            r#"
            SELECT entry_id, borrower_id, book_id, checkout_at, due_at, return_at
            FROM ledger_entries
            WHERE entry_id = $1 AND borrower_id = $2 AND return_at IS NULL
            "#,
        )
        .bind(entry_id.value())
        .bind(borrower_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_entry))
    }

    async fn close(
        &self,
        entry_id: EntryId,
        borrower_id: BorrowerId,
        return_at: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET return_at = $3
            WHERE entry_id = $1 AND borrower_id = $2 AND return_at IS NULL
            RETURNING entry_id, borrower_id, book_id, checkout_at, due_at, return_at
            "#,
        )
        .bind(entry_id.value())
        .bind(borrower_id.value())
        .bind(return_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_entry))
    }

    async fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT entry_id, borrower_id, book_id, checkout_at, due_at, return_at
            FROM ledger_entries
            WHERE return_at IS NULL AND due_at < $1
            ORDER BY due_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_entry).collect())
    }
}
