//! Mock output pin recording every level change.

use crate::{HardwareError, Result, traits::OutputPin, types::Level};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// One recorded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinChange {
    /// When the write happened (tokio clock, so paused-time tests are exact).
    pub at: Instant,

    /// Level written.
    pub level: Level,
}

#[derive(Debug)]
struct PinState {
    level: Level,
    history: Vec<PinChange>,
    failing: bool,
}

/// Mock GPIO output.
///
/// Clones share state, so a test can keep one clone for inspection while
/// the actuator owns another.
///
/// # Examples
///
/// ```
/// use doorway_hardware::mock::MockPin;
/// use doorway_hardware::traits::OutputPin;
/// use doorway_hardware::types::Level;
///
/// #[tokio::main]
/// async fn main() -> doorway_hardware::Result<()> {
///     let lock = MockPin::new(26);
///     let observed = lock.clone();
///
///     lock.set_level(Level::High)?;
///     lock.set_level(Level::Low)?;
///
///     assert_eq!(observed.level(), Level::Low);
///     assert_eq!(observed.high_pulses(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockPin {
    number: u8,
    state: Arc<Mutex<PinState>>,
}

impl MockPin {
    /// Create a pin starting low with an empty history.
    pub fn new(number: u8) -> Self {
        Self {
            number,
            state: Arc::new(Mutex::new(PinState {
                level: Level::Low,
                history: Vec::new(),
                failing: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, PinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current level.
    pub fn level(&self) -> Level {
        self.state().level
    }

    /// Every successful write, oldest first.
    pub fn history(&self) -> Vec<PinChange> {
        self.state().history.clone()
    }

    /// Returns `true` if the pin was ever driven high.
    pub fn was_energized(&self) -> bool {
        self.state().history.iter().any(|c| c.level.is_high())
    }

    /// Number of low-to-high transitions recorded.
    pub fn high_pulses(&self) -> usize {
        let state = self.state();
        let mut previous = Level::Low;
        let mut count = 0;
        for change in &state.history {
            if previous == Level::Low && change.level == Level::High {
                count += 1;
            }
            previous = change.level;
        }
        count
    }

    /// Durations of each completed high period, in order.
    pub fn high_periods(&self) -> Vec<std::time::Duration> {
        let state = self.state();
        let mut periods = Vec::new();
        let mut rose_at: Option<Instant> = None;
        for change in &state.history {
            match (change.level, rose_at) {
                (Level::High, None) => rose_at = Some(change.at),
                (Level::Low, Some(start)) => {
                    periods.push(change.at - start);
                    rose_at = None;
                }
                _ => {}
            }
        }
        periods
    }

    /// Make subsequent writes fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }
}

impl OutputPin for MockPin {
    fn set_level(&self, level: Level) -> Result<()> {
        let mut state = self.state();
        if state.failing {
            return Err(HardwareError::pin(self.number, "injected failure"));
        }
        state.level = level;
        state.history.push(PinChange {
            at: Instant::now(),
            level,
        });
        Ok(())
    }

    fn number(&self) -> u8 {
        self.number
    }
}
