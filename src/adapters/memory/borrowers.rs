use crate::domain::value_objects::BorrowerId;
use crate::ports::borrower_directory::{BorrowerDirectory as BorrowerDirectoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory BorrowerDirectory.
///
/// Stores the set of active borrower ids. `deactivate` models the
/// identity store's soft delete: the id stops resolving for new
/// checkouts while any open entries remain returnable.
pub struct BorrowerDirectory {
    active: Mutex<HashSet<BorrowerId>>,
}

impl BorrowerDirectory {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Register an active borrower.
    pub fn add_borrower(&self, borrower_id: BorrowerId) {
        self.active.lock().unwrap().insert(borrower_id);
    }

    /// Soft-delete a borrower.
    pub fn deactivate(&self, borrower_id: BorrowerId) {
        self.active.lock().unwrap().remove(&borrower_id);
    }
}

impl Default for BorrowerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BorrowerDirectoryTrait for BorrowerDirectory {
    async fn is_active(&self, borrower_id: BorrowerId) -> Result<bool> {
        Ok(self.active.lock().unwrap().contains(&borrower_id))
    }
}
