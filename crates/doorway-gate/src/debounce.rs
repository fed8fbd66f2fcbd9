//! Process-wide rate limit on access attempts.
//!
//! Both credential sources share one [`DebounceGate`]. An attempt passes only
//! if it arrives strictly later than `last_pass + quiet_period`; a pass moves
//! `last_pass` forward, a rejection leaves it untouched. The quiet period
//! therefore applies to attempts, whatever their verification outcome.
//!
//! ```
//! use doorway_gate::DebounceGate;
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! let gate = DebounceGate::new(Duration::from_secs(10));
//! let t0 = Instant::now();
//!
//! assert!(gate.try_acquire(t0));
//! assert!(!gate.try_acquire(t0 + Duration::from_secs(3)));
//! assert!(gate.try_acquire(t0 + Duration::from_secs(11)));
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Shared quiet-period gate.
#[derive(Debug)]
pub struct DebounceGate {
    quiet_period: Duration,

    /// `None` until the first pass, so the first attempt always gets through.
    last_pass: Mutex<Option<Instant>>,
}

impl DebounceGate {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_pass: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Try to pass the gate at `now`.
    ///
    /// Returns `true` and records `now` as the last pass if the quiet period
    /// since the previous pass has fully elapsed. The comparison and the
    /// update happen under one lock, so two concurrent callers can never
    /// both pass inside one quiet period.
    pub fn try_acquire(&self, now: Instant) -> bool {
        // The critical section cannot panic, so a poisoned lock still holds
        // a consistent value.
        let mut last_pass = self
            .last_pass
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let open = match *last_pass {
            None => true,
            Some(previous) => previous
                .checked_add(self.quiet_period)
                .is_some_and(|threshold| now > threshold),
        };

        if open {
            *last_pass = Some(now);
        }
        open
    }
}
