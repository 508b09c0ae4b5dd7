use serde::{Deserialize, Serialize};

use super::{BookId, BorrowerId, EntryId};

/// Command: check a book out to a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
}

/// Command: return a checked-out book.
///
/// `borrower_id` is the acting identity; it must match the entry's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub entry_id: EntryId,
    pub borrower_id: BorrowerId,
}
