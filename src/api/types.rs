use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::commands::{Checkout, ReturnBook};
use crate::domain::entry::LedgerEntry;
use crate::domain::value_objects::{BookId, BorrowerId, EntryId};

/// Request body for POST /checkout.
///
/// `borrower_id` is the already-authenticated acting identity; the auth
/// layer in front of this service owns establishing it.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
}

impl CheckoutRequest {
    pub fn to_command(&self) -> Checkout {
        Checkout {
            borrower_id: BorrowerId::from_uuid(self.borrower_id),
            book_id: BookId::from_uuid(self.book_id),
        }
    }
}

/// Request body for POST /entries/:id/return.
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub borrower_id: Uuid,
}

impl ReturnRequest {
    pub fn to_command(&self, entry_id: Uuid) -> ReturnBook {
        ReturnBook {
            entry_id: EntryId::from_uuid(entry_id),
            borrower_id: BorrowerId::from_uuid(self.borrower_id),
        }
    }
}

/// Query parameters for GET /entries/:id.
#[derive(Debug, Deserialize)]
pub struct OpenEntryQuery {
    pub borrower_id: Uuid,
}

/// Ledger entry response body.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub entry_id: Uuid,
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub checkout_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub return_at: Option<DateTime<Utc>>,
}

impl From<LedgerEntry> for EntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            entry_id: entry.entry_id.value(),
            borrower_id: entry.borrower_id.value(),
            book_id: entry.book_id.value(),
            checkout_at: entry.checkout_at,
            due_at: entry.due_at,
            return_at: entry.return_at,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
