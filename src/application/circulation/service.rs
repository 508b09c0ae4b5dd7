use crate::domain::commands::{Checkout, ReturnBook};
use crate::domain::entry::LedgerEntry;
use crate::domain::value_objects::{BorrowerId, EntryId};
use crate::ports::{BorrowerDirectory, CatalogStore, Clock, InsertOutcome, LedgerEntryStore};
use std::sync::Arc;

use super::errors::{CirculationError, Result};

/// Service dependencies.
///
/// A plain data structure of ports; the operations are free functions
/// that take it by reference. Every dependency is explicit, which keeps
/// the functions composable and the tests obvious.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog: Arc<dyn CatalogStore>,
    pub ledger: Arc<dyn LedgerEntryStore>,
    pub borrowers: Arc<dyn BorrowerDirectory>,
    pub clock: Arc<dyn Clock>,
}

/// Check a book out to a borrower.
///
/// Enforced rules:
/// - the borrower resolves to an active identity (re-validated here even
///   though the caller authenticates first)
/// - the book exists
/// - at least one copy is available
/// - the borrower holds no open entry for the same book
///
/// The decrement-and-insert pair is indivisible with respect to other
/// checkouts: the decrement is a storage-level conditional update, the
/// duplicate guard is a storage-level uniqueness constraint, and a lost
/// insert race hands its copy back before the error surfaces. No
/// interleaving can oversell a book or commit two open entries for one
/// `(borrower, book)` pair.
pub async fn checkout(deps: &ServiceDependencies, cmd: Checkout) -> Result<LedgerEntry> {
    // 1. Borrower must be active (soft-deleted identities are rejected)
    let active = deps
        .borrowers
        .is_active(cmd.borrower_id)
        .await
        .map_err(CirculationError::DirectoryError)?;

    if !active {
        return Err(CirculationError::BorrowerInactive);
    }

    // 2. Book must exist
    let book = deps
        .catalog
        .get_book(cmd.book_id)
        .await
        .map_err(CirculationError::CatalogError)?;

    if book.is_none() {
        return Err(CirculationError::BookNotFound);
    }

    // 3. Duplicate-checkout guard, fast path. The insert constraint in
    //    step 5 is authoritative under races.
    let open_entry = deps
        .ledger
        .find_open_by_borrower_and_book(cmd.borrower_id, cmd.book_id)
        .await
        .map_err(CirculationError::LedgerError)?;

    if open_entry.is_some() {
        return Err(CirculationError::AlreadyCheckedOut);
    }

    // 4. Take a copy off the shelf. Conditional decrement: of two
    //    concurrent checkouts of the last copy exactly one passes.
    let decremented = deps
        .catalog
        .try_decrement_available(cmd.book_id)
        .await
        .map_err(CirculationError::CatalogError)?;

    if !decremented {
        return Err(CirculationError::NoCopiesAvailable);
    }

    // 5. Record the entry. If the insert loses a duplicate race or fails
    //    outright, the copy goes back so no partial state survives.
    let entry = LedgerEntry::open(cmd.borrower_id, cmd.book_id, deps.clock.now());

    match deps.ledger.insert(entry.clone()).await {
        Ok(InsertOutcome::Inserted) => Ok(entry),
        Ok(InsertOutcome::DuplicateOpen) => {
            restore_copy(deps, &cmd).await;
            Err(CirculationError::AlreadyCheckedOut)
        }
        Err(e) => {
            restore_copy(deps, &cmd).await;
            Err(CirculationError::LedgerError(e))
        }
    }
}

/// Hand a decremented copy back after a failed insert.
///
/// A failure here leaves the counter conservatively low (a copy appears
/// on loan that is not); it can never oversell. Logged for operator
/// reconciliation.
async fn restore_copy(deps: &ServiceDependencies, cmd: &Checkout) {
    if let Err(e) = deps.catalog.increment_available(cmd.book_id).await {
        tracing::error!(
            book_id = %cmd.book_id.value(),
            error = %e,
            "failed to restore availability after aborted checkout"
        );
    }
}

/// Return a checked-out book.
///
/// The close is a single conditional operation (only-if-open,
/// only-if-owner), so a concurrent double return resolves to exactly one
/// success; the loser gets `EntryNotFound`. The increment is capped at
/// `total_copies` by the catalog store.
///
/// Once the close commits it is authoritative: a failed increment leaves
/// the counter conservatively low (never overselling) and is logged for
/// operator reconciliation, while the caller still receives the closed
/// entry. Reporting failure here would strand the caller with an entry a
/// retry can no longer find.
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<LedgerEntry> {
    let closed = deps
        .ledger
        .close(cmd.entry_id, cmd.borrower_id, deps.clock.now())
        .await
        .map_err(CirculationError::LedgerError)?;

    let entry = closed.ok_or(CirculationError::EntryNotFound)?;

    if let Err(e) = deps.catalog.increment_available(entry.book_id).await {
        tracing::error!(
            book_id = %entry.book_id.value(),
            entry_id = %entry.entry_id.value(),
            error = %e,
            "failed to restore availability after committed return"
        );
    }

    Ok(entry)
}

/// All open, past-due entries, oldest overdue first.
///
/// Derived view over the ledger joined with the clock; read-only and
/// safe to call repeatedly. May miss an entry that closes mid-scan.
pub async fn list_overdue(deps: &ServiceDependencies) -> Result<Vec<LedgerEntry>> {
    deps.ledger
        .list_overdue(deps.clock.now())
        .await
        .map_err(CirculationError::LedgerError)
}

/// Look up an open entry for the acting borrower.
pub async fn find_open_entry(
    deps: &ServiceDependencies,
    entry_id: EntryId,
    borrower_id: BorrowerId,
) -> Result<LedgerEntry> {
    deps.ledger
        .find_open_by_id(entry_id, borrower_id)
        .await
        .map_err(CirculationError::LedgerError)?
        .ok_or(CirculationError::EntryNotFound)
}
