use chrono::{Duration, Utc};
use circulation_ledger::adapters::memory::{
    BorrowerDirectory, CatalogStore, LedgerEntryStore, ManualClock,
};
use circulation_ledger::application::circulation::{
    CirculationError, ServiceDependencies, checkout, find_open_entry, list_overdue, return_book,
};
use circulation_ledger::domain::commands::{Checkout, ReturnBook};
use circulation_ledger::domain::value_objects::{BookId, BorrowerId, Isbn};
use circulation_ledger::ports::catalog_store::{self, Book};
use circulation_ledger::ports::{CatalogStore as CatalogStoreTrait, Clock as _};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    deps: ServiceDependencies,
    catalog: Arc<CatalogStore>,
    borrowers: Arc<BorrowerDirectory>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let catalog = Arc::new(CatalogStore::new());
    let ledger = Arc::new(LedgerEntryStore::new());
    let borrowers = Arc::new(BorrowerDirectory::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let deps = ServiceDependencies {
        catalog: catalog.clone(),
        ledger,
        borrowers: borrowers.clone(),
        clock: clock.clone(),
    };

    Fixture {
        deps,
        catalog,
        borrowers,
        clock,
    }
}

fn add_book(f: &Fixture, isbn: &str, total_copies: u32, available_copies: u32) -> BookId {
    let book_id = BookId::new();
    f.catalog.add_book(Book {
        book_id,
        isbn: Isbn::try_from(isbn.to_string()).unwrap(),
        title: "The Hobbit".to_string(),
        author: "J.R.R. Tolkien".to_string(),
        total_copies,
        available_copies,
    });
    book_id
}

fn add_borrower(f: &Fixture) -> BorrowerId {
    let borrower_id = BorrowerId::new();
    f.borrowers.add_borrower(borrower_id);
    borrower_id
}

async fn available_copies(f: &Fixture, book_id: BookId) -> u32 {
    f.catalog
        .get_book(book_id)
        .await
        .unwrap()
        .unwrap()
        .available_copies
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_decrements_availability_and_sets_due_date() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let borrower_id = add_borrower(&f);
    let now = f.clock.now();

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();

    assert_eq!(entry.borrower_id, borrower_id);
    assert_eq!(entry.book_id, book_id);
    assert_eq!(entry.checkout_at, now);
    assert_eq!(entry.due_at, now + Duration::days(14));
    assert!(entry.return_at.is_none());
    assert_eq!(available_copies(&f, book_id).await, 2);
}

#[tokio::test]
async fn test_checkout_rejects_duplicate_open_loan() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let borrower_id = add_borrower(&f);

    let cmd = Checkout {
        borrower_id,
        book_id,
    };
    checkout(&f.deps, cmd).await.unwrap();
    let result = checkout(&f.deps, cmd).await;

    assert!(matches!(
        result.unwrap_err(),
        CirculationError::AlreadyCheckedOut
    ));
    // the failed attempt must not touch the counter
    assert_eq!(available_copies(&f, book_id).await, 2);
}

#[tokio::test]
async fn test_checkout_rejects_when_no_copies_available() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 0);
    let borrower_id = add_borrower(&f);

    let result = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await;

    assert!(matches!(
        result.unwrap_err(),
        CirculationError::NoCopiesAvailable
    ));
}

#[tokio::test]
async fn test_checkout_rejects_unknown_book() {
    let f = fixture();
    let borrower_id = add_borrower(&f);

    let result = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id: BookId::new(),
        },
    )
    .await;

    assert!(matches!(result.unwrap_err(), CirculationError::BookNotFound));
}

#[tokio::test]
async fn test_checkout_rejects_inactive_borrower() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);

    let result = checkout(
        &f.deps,
        Checkout {
            borrower_id: BorrowerId::new(),
            book_id,
        },
    )
    .await;

    assert!(matches!(
        result.unwrap_err(),
        CirculationError::BorrowerInactive
    ));
    assert_eq!(available_copies(&f, book_id).await, 1);
}

#[tokio::test]
async fn test_different_borrowers_can_hold_the_same_book() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 2, 2);
    let u1 = add_borrower(&f);
    let u2 = add_borrower(&f);

    checkout(
        &f.deps,
        Checkout {
            borrower_id: u1,
            book_id,
        },
    )
    .await
    .unwrap();
    checkout(
        &f.deps,
        Checkout {
            borrower_id: u2,
            book_id,
        },
    )
    .await
    .unwrap();

    assert_eq!(available_copies(&f, book_id).await, 0);
}

// ============================================================================
// Return
// ============================================================================

#[tokio::test]
async fn test_checkout_then_return_restores_availability() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let borrower_id = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();
    assert_eq!(available_copies(&f, book_id).await, 2);

    f.clock.advance(Duration::days(3));
    let closed = return_book(
        &f.deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id,
        },
    )
    .await
    .unwrap();

    assert_eq!(available_copies(&f, book_id).await, 3);
    assert!(closed.return_at.unwrap() >= closed.checkout_at);
    assert_eq!(closed.return_at.unwrap(), entry.checkout_at + Duration::days(3));
}

#[tokio::test]
async fn test_second_return_of_same_entry_fails() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let borrower_id = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();

    let cmd = ReturnBook {
        entry_id: entry.entry_id,
        borrower_id,
    };
    return_book(&f.deps, cmd).await.unwrap();
    let result = return_book(&f.deps, cmd).await;

    assert!(matches!(
        result.unwrap_err(),
        CirculationError::EntryNotFound
    ));
    // the counter was restored exactly once
    assert_eq!(available_copies(&f, book_id).await, 3);
}

#[tokio::test]
async fn test_return_by_non_owner_fails_without_leaking_existence() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let owner = add_borrower(&f);
    let other = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id: owner,
            book_id,
        },
    )
    .await
    .unwrap();

    let result = return_book(
        &f.deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id: other,
        },
    )
    .await;

    assert!(matches!(
        result.unwrap_err(),
        CirculationError::EntryNotFound
    ));
    // the loan is untouched
    assert_eq!(available_copies(&f, book_id).await, 2);
    assert!(
        find_open_entry(&f.deps, entry.entry_id, owner)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_deactivated_borrower_can_still_return_open_loan() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);
    let borrower_id = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();

    // soft delete: new checkouts rejected, open loans stay valid
    f.borrowers.deactivate(borrower_id);

    let result = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await;
    assert!(matches!(
        result.unwrap_err(),
        CirculationError::BorrowerInactive
    ));

    return_book(
        &f.deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id,
        },
    )
    .await
    .unwrap();
    assert_eq!(available_copies(&f, book_id).await, 1);
}

/// Catalog wrapper that fails increments on demand, standing in for a
/// store that loses connectivity mid-operation.
struct UnreliableCatalog {
    inner: CatalogStore,
    fail_increments: AtomicBool,
}

impl UnreliableCatalog {
    fn new() -> Self {
        Self {
            inner: CatalogStore::new(),
            fail_increments: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStoreTrait for UnreliableCatalog {
    async fn get_book(
        &self,
        book_id: BookId,
    ) -> catalog_store::Result<Option<Book>> {
        self.inner.get_book(book_id).await
    }

    async fn try_decrement_available(&self, book_id: BookId) -> catalog_store::Result<bool> {
        self.inner.try_decrement_available(book_id).await
    }

    async fn increment_available(&self, book_id: BookId) -> catalog_store::Result<()> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(Box::new(std::io::Error::other("catalog connection lost")));
        }
        self.inner.increment_available(book_id).await
    }
}

#[tokio::test]
async fn test_return_commits_close_when_availability_restore_fails() {
    let catalog = Arc::new(UnreliableCatalog::new());
    let ledger = Arc::new(LedgerEntryStore::new());
    let borrowers = Arc::new(BorrowerDirectory::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let deps = ServiceDependencies {
        catalog: catalog.clone(),
        ledger,
        borrowers: borrowers.clone(),
        clock,
    };

    let book_id = BookId::new();
    catalog.inner.add_book(Book {
        book_id,
        isbn: Isbn::try_from("1234567890127".to_string()).unwrap(),
        title: "The Hobbit".to_string(),
        author: "J.R.R. Tolkien".to_string(),
        total_copies: 1,
        available_copies: 1,
    });
    let borrower_id = BorrowerId::new();
    borrowers.add_borrower(borrower_id);

    let entry = checkout(
        &deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();

    catalog.fail_increments.store(true, Ordering::SeqCst);

    // the committed close is authoritative: the caller gets the closed
    // entry even though the counter could not be restored
    let closed = return_book(
        &deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id,
        },
    )
    .await
    .unwrap();
    assert!(closed.return_at.is_some());

    // a retry sees the entry as already returned, not as still open
    let retry = return_book(
        &deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id,
        },
    )
    .await;
    assert!(matches!(retry.unwrap_err(), CirculationError::EntryNotFound));

    // the counter stays conservatively low until reconciliation; it can
    // never oversell
    let book = catalog.inner.get_book(book_id).await.unwrap().unwrap();
    assert_eq!(book.available_copies, 0);
}

// ============================================================================
// Overdue
// ============================================================================

#[tokio::test]
async fn test_overdue_entry_appears_and_clears_on_return() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 3, 3);
    let borrower_id = add_borrower(&f);

    // checkout 20 days ago, due 5 days ago
    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();
    f.clock.advance(Duration::days(20));

    let overdue = list_overdue(&f.deps).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].entry_id, entry.entry_id);

    return_book(
        &f.deps,
        ReturnBook {
            entry_id: entry.entry_id,
            borrower_id,
        },
    )
    .await
    .unwrap();

    assert!(list_overdue(&f.deps).await.unwrap().is_empty());
    assert_eq!(available_copies(&f, book_id).await, 3);
}

#[tokio::test]
async fn test_overdue_list_is_ordered_oldest_first() {
    let f = fixture();
    let first_book = add_book(&f, "1234567890127", 1, 1);
    let second_book = add_book(&f, "9781234567897", 1, 1);
    let borrower_id = add_borrower(&f);

    let first = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id: first_book,
        },
    )
    .await
    .unwrap();
    f.clock.advance(Duration::days(5));
    let second = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id: second_book,
        },
    )
    .await
    .unwrap();

    f.clock.advance(Duration::days(30));
    let overdue = list_overdue(&f.deps).await.unwrap();

    assert_eq!(overdue.len(), 2);
    assert_eq!(overdue[0].entry_id, first.entry_id);
    assert_eq!(overdue[1].entry_id, second.entry_id);
}

#[tokio::test]
async fn test_entry_within_loan_period_is_not_overdue() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);
    let borrower_id = add_borrower(&f);

    checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();
    f.clock.advance(Duration::days(13));

    assert!(list_overdue(&f.deps).await.unwrap().is_empty());
}

// ============================================================================
// Open-entry lookup
// ============================================================================

#[tokio::test]
async fn test_find_open_entry_scoped_to_owner() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);
    let owner = add_borrower(&f);
    let other = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id: owner,
            book_id,
        },
    )
    .await
    .unwrap();

    let found = find_open_entry(&f.deps, entry.entry_id, owner).await.unwrap();
    assert_eq!(found.entry_id, entry.entry_id);

    let result = find_open_entry(&f.deps, entry.entry_id, other).await;
    assert!(matches!(
        result.unwrap_err(),
        CirculationError::EntryNotFound
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkout_of_last_copy_yields_one_success() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);
    let u1 = add_borrower(&f);
    let u2 = add_borrower(&f);

    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let mut handles = Vec::new();
    for borrower_id in [u1, u2] {
        let deps = f.deps.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            checkout(
                &deps,
                Checkout {
                    borrower_id,
                    book_id,
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CirculationError::NoCopiesAvailable) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(available_copies(&f, book_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_checkout_commits_once() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 2, 2);
    let borrower_id = add_borrower(&f);

    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let deps = f.deps.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            checkout(
                &deps,
                Checkout {
                    borrower_id,
                    book_id,
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CirculationError::AlreadyCheckedOut) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    // one open entry, and the loser's decrement was handed back
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(available_copies(&f, book_id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_double_return_closes_once() {
    let f = fixture();
    let book_id = add_book(&f, "1234567890127", 1, 1);
    let borrower_id = add_borrower(&f);

    let entry = checkout(
        &f.deps,
        Checkout {
            borrower_id,
            book_id,
        },
    )
    .await
    .unwrap();

    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let deps = f.deps.clone();
        let barrier = barrier.clone();
        let entry_id = entry.entry_id;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            return_book(
                &deps,
                ReturnBook {
                    entry_id,
                    borrower_id,
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut not_found = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(CirculationError::EntryNotFound) => not_found += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(not_found, 1);
    // incremented exactly once, never past total_copies
    assert_eq!(available_copies(&f, book_id).await, 1);
}
