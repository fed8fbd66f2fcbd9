//! Lock relay and buzzer sequencing.
//!
//! An accepted attempt plays the approved buzzer pattern, then holds the
//! lock relay energized for the open duration. A denied attempt plays the
//! denied pattern and never touches the lock.
//!
//! Every pin driven high is covered by a guard that drives it low again if
//! the sequence is cancelled mid-way (source task aborted at shutdown), so
//! an interrupted sequence never leaves the door unlocked or the buzzer on.

use doorway_core::config::{BuzzerConfig, Config, PulseConfig};
use doorway_core::constants::{
    APPROVED_OFF_MS, APPROVED_ON_MS, APPROVED_PULSES, DENIED_OFF_MS, DENIED_ON_MS, DENIED_PULSES,
};
use doorway_hardware::{HardwareError, Level, OutputPin};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// A buzzer pulse train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerPattern {
    pub pulses: u32,
    pub on: Duration,
    pub off: Duration,
}

impl BuzzerPattern {
    /// Three short beeps.
    pub const APPROVED: Self = Self {
        pulses: APPROVED_PULSES,
        on: Duration::from_millis(APPROVED_ON_MS),
        off: Duration::from_millis(APPROVED_OFF_MS),
    };

    /// One long beep.
    pub const DENIED: Self = Self {
        pulses: DENIED_PULSES,
        on: Duration::from_millis(DENIED_ON_MS),
        off: Duration::from_millis(DENIED_OFF_MS),
    };

    /// Time the pattern takes to play.
    pub fn duration(&self) -> Duration {
        (self.on + self.off) * self.pulses
    }
}

impl From<PulseConfig> for BuzzerPattern {
    fn from(config: PulseConfig) -> Self {
        Self {
            pulses: config.pulses,
            on: Duration::from_millis(config.on_ms),
            off: Duration::from_millis(config.off_ms),
        }
    }
}

/// Drives a pin low when dropped unless disarmed by [`LowOnDrop::finish`].
struct LowOnDrop<'a, P: OutputPin> {
    pin: &'a P,
    armed: bool,
}

impl<'a, P: OutputPin> LowOnDrop<'a, P> {
    fn raise(pin: &'a P) -> Result<Self, HardwareError> {
        pin.set_level(Level::High)?;
        Ok(Self { pin, armed: true })
    }

    fn finish(mut self) -> Result<(), HardwareError> {
        self.armed = false;
        self.pin.set_level(Level::Low)
    }
}

impl<P: OutputPin> Drop for LowOnDrop<'_, P> {
    fn drop(&mut self) {
        if self.armed
            && let Err(e) = self.pin.set_level(Level::Low)
        {
            error!(pin = self.pin.number(), error = %e, "Failed to drive interrupted output low");
        }
    }
}

/// Lock and buzzer outputs with their timing.
///
/// Methods take `&self`; one actuator is shared by both sources.
#[derive(Debug)]
pub struct Actuator<P> {
    lock: P,
    buzzer: P,
    open_duration: Duration,
    approved: BuzzerPattern,
    denied: BuzzerPattern,
}

impl<P: OutputPin> Actuator<P> {
    /// Create an actuator with the default buzzer patterns.
    pub fn new(lock: P, buzzer: P, open_duration: Duration) -> Self {
        Self {
            lock,
            buzzer,
            open_duration,
            approved: BuzzerPattern::APPROVED,
            denied: BuzzerPattern::DENIED,
        }
    }

    /// Create an actuator using the lock and buzzer sections of `config`.
    pub fn from_config(lock: P, buzzer: P, config: &Config) -> Self {
        let BuzzerConfig {
            approved, denied, ..
        } = &config.buzzer;
        Self::new(lock, buzzer, config.lock.open_duration())
            .with_patterns((*approved).into(), (*denied).into())
    }

    /// Replace both buzzer patterns.
    pub fn with_patterns(mut self, approved: BuzzerPattern, denied: BuzzerPattern) -> Self {
        self.approved = approved;
        self.denied = denied;
        self
    }

    pub fn open_duration(&self) -> Duration {
        self.open_duration
    }

    /// Play the approved pattern, then open the lock for the open duration.
    ///
    /// # Errors
    ///
    /// Returns the first pin write failure. The lock stays closed if the
    /// buzzer fails.
    pub async fn approved(&self) -> Result<(), HardwareError> {
        self.buzz(self.approved).await?;

        debug!(pin = self.lock.number(), duration = ?self.open_duration, "Opening lock");
        let lock = LowOnDrop::raise(&self.lock)?;
        tokio::time::sleep(self.open_duration).await;
        lock.finish()?;
        debug!(pin = self.lock.number(), "Lock closed");
        Ok(())
    }

    /// Play the denied pattern. The lock is not touched.
    ///
    /// # Errors
    ///
    /// Returns the first buzzer write failure.
    pub async fn denied(&self) -> Result<(), HardwareError> {
        self.buzz(self.denied).await
    }

    /// Drive every output low (locked, silent).
    ///
    /// Both pins are attempted even if the first write fails.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn release(&self) -> Result<(), HardwareError> {
        let lock = self.lock.set_level(Level::Low);
        let buzzer = self.buzzer.set_level(Level::Low);
        lock.and(buzzer)
    }

    /// Guard that releases the outputs when dropped.
    pub fn guard(self: &Arc<Self>) -> ActuatorGuard<P> {
        ActuatorGuard {
            actuator: Some(Arc::clone(self)),
        }
    }

    async fn buzz(&self, pattern: BuzzerPattern) -> Result<(), HardwareError> {
        for _ in 0..pattern.pulses {
            let buzzer = LowOnDrop::raise(&self.buzzer)?;
            tokio::time::sleep(pattern.on).await;
            buzzer.finish()?;
            tokio::time::sleep(pattern.off).await;
        }
        Ok(())
    }
}

/// Releases the actuator outputs on drop.
///
/// Held by the supervisor for the lifetime of a run so that an early
/// return or a panic still leaves the door locked and the buzzer silent.
#[derive(Debug)]
#[must_use = "the outputs are released as soon as the guard is dropped"]
pub struct ActuatorGuard<P: OutputPin> {
    actuator: Option<Arc<Actuator<P>>>,
}

impl<P: OutputPin> ActuatorGuard<P> {
    /// Release now and report the result.
    ///
    /// # Errors
    ///
    /// Returns the first pin write failure.
    pub fn release(mut self) -> Result<(), HardwareError> {
        match self.actuator.take() {
            Some(actuator) => actuator.release(),
            None => Ok(()),
        }
    }
}

impl<P: OutputPin> Drop for ActuatorGuard<P> {
    fn drop(&mut self) {
        if let Some(actuator) = self.actuator.take()
            && let Err(e) = actuator.release()
        {
            error!(error = %e, "Failed to release outputs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorway_hardware::mock::MockPin;
    use rstest::rstest;

    fn actuator() -> (Actuator<MockPin>, MockPin, MockPin) {
        let lock = MockPin::new(26);
        let buzzer = MockPin::new(16);
        let actuator = Actuator::new(lock.clone(), buzzer.clone(), Duration::from_secs(2));
        (actuator, lock, buzzer)
    }

    #[rstest]
    #[case(BuzzerPattern::APPROVED, 450)]
    #[case(BuzzerPattern::DENIED, 1000)]
    #[case(BuzzerPattern::from(PulseConfig { pulses: 2, on_ms: 200, off_ms: 0 }), 400)]
    fn test_pattern_duration(#[case] pattern: BuzzerPattern, #[case] expected_ms: u64) {
        assert_eq!(pattern.duration(), Duration::from_millis(expected_ms));
    }

    #[test]
    fn test_from_config_uses_configured_patterns() {
        let mut config = Config::default();
        config.lock.open_secs = 5;
        config.buzzer.denied = PulseConfig {
            pulses: 2,
            on_ms: 300,
            off_ms: 100,
        };

        let actuator = Actuator::from_config(MockPin::new(26), MockPin::new(16), &config);

        assert_eq!(actuator.open_duration(), Duration::from_secs(5));
        assert_eq!(actuator.approved, BuzzerPattern::APPROVED);
        assert_eq!(
            actuator.denied,
            BuzzerPattern {
                pulses: 2,
                on: Duration::from_millis(300),
                off: Duration::from_millis(100),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_approved_sequence() {
        let (actuator, lock, buzzer) = actuator();

        actuator.approved().await.unwrap();

        assert_eq!(buzzer.high_periods(), vec![Duration::from_millis(100); 3]);
        assert_eq!(lock.high_periods(), vec![Duration::from_secs(2)]);
        assert_eq!(lock.level(), Level::Low);

        // Lock opens only after the last beep's off time.
        let first_lock = lock.history()[0].at;
        let last_buzz = buzzer.history().last().unwrap().at;
        assert_eq!(first_lock - last_buzz, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_sequence_leaves_lock_alone() {
        let (actuator, lock, buzzer) = actuator();

        actuator.denied().await.unwrap();

        assert_eq!(buzzer.high_periods(), vec![Duration::from_secs(1)]);
        assert!(lock.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_buzzer_failure_keeps_lock_closed() {
        let (actuator, lock, buzzer) = actuator();
        buzzer.set_failing(true);

        assert!(actuator.approved().await.is_err());
        assert!(!lock.was_energized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_open_drives_lock_low() {
        let (actuator, lock, _buzzer) = actuator();

        let interrupted =
            tokio::time::timeout(Duration::from_secs(1), actuator.approved()).await;

        assert!(interrupted.is_err());
        assert!(lock.was_energized());
        assert_eq!(lock.level(), Level::Low);
    }

    #[test]
    fn test_release_attempts_both_pins() {
        let (actuator, lock, buzzer) = actuator();
        lock.set_level(Level::High).unwrap();
        buzzer.set_level(Level::High).unwrap();
        lock.set_failing(true);

        assert!(actuator.release().is_err());
        assert_eq!(buzzer.level(), Level::Low);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let (actuator, lock, buzzer) = actuator();
        let actuator = Arc::new(actuator);
        lock.set_level(Level::High).unwrap();
        buzzer.set_level(Level::High).unwrap();

        drop(actuator.guard());

        assert_eq!(lock.level(), Level::Low);
        assert_eq!(buzzer.level(), Level::Low);
    }

    #[test]
    fn test_guard_explicit_release() {
        let (actuator, lock, _buzzer) = actuator();
        let actuator = Arc::new(actuator);
        lock.set_level(Level::High).unwrap();

        actuator.guard().release().unwrap();
        assert_eq!(lock.level(), Level::Low);
    }
}
