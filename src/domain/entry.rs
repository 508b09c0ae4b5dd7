use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowerId, EntryId};

/// Loan period in days, added to the checkout time to compute the due date.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Error raised when closing a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseEntryError {
    /// The entry was already returned. CLOSED is terminal.
    AlreadyReturned,
}

/// One checkout-to-return record - the unit of circulation history.
///
/// Lifecycle: created open by checkout, closed exactly once by return,
/// never deleted (append-only audit trail). "Overdue" is a derived view
/// (`open && due_at < now`), never stored, so it cannot drift from the
/// clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
    pub checkout_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    /// None while the loan is outstanding.
    pub return_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Create an open entry. The due date is `checkout_at + LOAN_PERIOD_DAYS`.
    pub fn open(borrower_id: BorrowerId, book_id: BookId, checkout_at: DateTime<Utc>) -> Self {
        Self {
            entry_id: EntryId::new(),
            borrower_id,
            book_id,
            checkout_at,
            due_at: checkout_at + Duration::days(LOAN_PERIOD_DAYS),
            return_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_at.is_none()
    }

    /// An entry is overdue while it is still open past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_at < now
    }

    /// Close the entry, recording the return time.
    ///
    /// # Errors
    /// `CloseEntryError::AlreadyReturned` if the entry is already closed.
    pub fn close(self, return_at: DateTime<Utc>) -> Result<Self, CloseEntryError> {
        if self.return_at.is_some() {
            return Err(CloseEntryError::AlreadyReturned);
        }
        Ok(Self {
            return_at: Some(return_at),
            ..self
        })
    }
}
