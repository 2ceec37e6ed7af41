//! Injectable time source

use chrono::{DateTime, Utc};

/// Time source for the store. Swapped out in tests to drive expiry
/// deterministically instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_current() {
        let clock = SystemClock;
        let diff = (Utc::now() - clock.now()).num_seconds();
        assert!(diff >= 0 && diff < 5);
    }
}
