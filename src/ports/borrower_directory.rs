use crate::domain::value_objects::BorrowerId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Borrower Directory port - lookup into the external identity store.
///
/// Identity is owned elsewhere; the ledger only asks one question.
/// Deactivation is a soft delete: an inactive borrower is rejected by new
/// checkouts, while their already-open entries stay valid and returnable.
#[async_trait]
pub trait BorrowerDirectory: Send + Sync {
    /// Whether the borrower resolves to an active identity.
    async fn is_active(&self, borrower_id: BorrowerId) -> Result<bool>;
}
