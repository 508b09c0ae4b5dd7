use crate::ports::clock::Clock;
use chrono::{DateTime, Utc};

/// Wall-clock Clock for production wiring.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
