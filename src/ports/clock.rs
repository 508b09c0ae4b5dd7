use chrono::{DateTime, Utc};

/// Clock port - the time source for due-date computation and overdue
/// comparison.
///
/// Injectable so tests can pin or advance time deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
