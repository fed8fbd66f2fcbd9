//! Credential source loops.
//!
//! Each loop polls one device forever and hands every credential to the
//! shared [`Dispatcher`], awaiting it in-line. Device errors never end a
//! loop: they are logged and the device is polled again, no faster than
//! once every [`MIN_POLL_INTERVAL_MS`] milliseconds.

use crate::dispatcher::Dispatcher;
use crate::feedback::FeedbackSink;
use crate::verifier::Verifier;
use doorway_core::Credential;
use doorway_core::constants::MIN_POLL_INTERVAL_MS;
use doorway_hardware::{CodeDecoder, FrameSource, HardwareError, OutputPin, TagRead, TagReader};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Consecutive failures between two `warn` lines for the same device.
const ERROR_LOG_EVERY: u64 = 100;

/// Keeps a persistently failing device from flooding the log: the first
/// failure of a streak and every [`ERROR_LOG_EVERY`]th after it are logged
/// at `warn`, the rest at `debug`.
#[derive(Debug, Default)]
struct ErrorStreak {
    consecutive: u64,
}

impl ErrorStreak {
    fn record(&mut self, source: &str, error: &HardwareError) {
        self.consecutive += 1;
        if self.consecutive == 1 || self.consecutive % ERROR_LOG_EVERY == 0 {
            warn!(source, error = %error, consecutive = self.consecutive, "Device error, retrying");
        } else {
            debug!(source, error = %error, consecutive = self.consecutive, "Device error, retrying");
        }
    }

    fn reset(&mut self, source: &str) {
        if self.consecutive > 0 {
            debug!(source, after = self.consecutive, "Device recovered");
            self.consecutive = 0;
        }
    }
}

/// Sleep out the rest of the minimum poll interval.
async fn pace(started: Instant) {
    let min = Duration::from_millis(MIN_POLL_INTERVAL_MS);
    let elapsed = started.elapsed();
    if elapsed < min {
        tokio::time::sleep(min - elapsed).await;
    }
}

/// Poll the tag reader and dispatch every identifier it reports.
///
/// Reads that time out without a tag are polled again. Never returns.
pub async fn tag_source<R, V, P, S>(mut reader: R, dispatcher: Arc<Dispatcher<V, P, S>>)
where
    R: TagReader,
    V: Verifier,
    P: OutputPin,
    S: FeedbackSink,
{
    debug!(reader = %reader.info(), "Tag source started");
    let mut errors = ErrorStreak::default();

    loop {
        let started = Instant::now();

        match reader.read_tag().await {
            Ok(TagRead { id: Some(id), text }) => {
                errors.reset("tag");
                debug!(%id, text_len = text.len(), "Tag read");
                dispatcher.handle(Credential::Tag { id }).await;
            }
            Ok(TagRead { id: None, .. }) => errors.reset("tag"),
            Err(e) => errors.record("tag", &e),
        }

        pace(started).await;
    }
}

/// Capture frames, decode them and dispatch each payload in decode order.
///
/// The camera is shared with the supervisor, which releases it at shutdown;
/// the lock is held only while a frame is being captured. Never returns.
pub async fn code_source<C, D, V, P, S>(
    camera: Arc<Mutex<C>>,
    decoder: D,
    dispatcher: Arc<Dispatcher<V, P, S>>,
) where
    C: FrameSource,
    D: CodeDecoder,
    V: Verifier,
    P: OutputPin,
    S: FeedbackSink,
{
    let info = camera.lock().await.info();
    debug!(camera = %info, "Code source started");
    let mut errors = ErrorStreak::default();

    loop {
        let started = Instant::now();

        let capture = camera.lock().await.capture().await;
        let payloads = capture.and_then(|frame| decoder.decode(&frame));

        match payloads {
            Ok(payloads) => {
                errors.reset("code");
                if !payloads.is_empty() {
                    debug!(count = payloads.len(), "Codes decoded");
                }
                for payload in payloads {
                    dispatcher.handle(Credential::Code { payload }).await;
                }
            }
            Err(e) => errors.record("code", &e),
        }

        pace(started).await;
    }
}

/// Block until the reader reports a tag and return that read.
///
/// # Errors
///
/// Returns the first device error; unlike the source loops this does not
/// retry.
pub async fn read_one<R: TagReader>(reader: &mut R) -> doorway_hardware::Result<TagRead> {
    loop {
        let started = Instant::now();
        let read = reader.read_tag().await?;
        if read.id.is_some() {
            return Ok(read);
        }
        pace(started).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Actuator;
    use crate::debounce::DebounceGate;
    use crate::feedback::MemoryFeedback;
    use doorway_hardware::line::TextDecoder;
    use doorway_hardware::mock::{MockCamera, MockPin, MockTagReader};
    use doorway_network::{StatusCode, Verification};

    struct DenyAll;

    impl Verifier for DenyAll {
        async fn verify(&self, _credential: &Credential) -> Verification {
            Verification::Rejected {
                status: StatusCode::FORBIDDEN,
            }
        }
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn test_source_loops_can_be_spawned() {
        let (reader, _tags) = MockTagReader::new();
        let (camera, _codes) = MockCamera::new();
        let actuator = Arc::new(Actuator::new(
            MockPin::new(26),
            MockPin::new(16),
            Duration::from_secs(2),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(DebounceGate::new(Duration::from_secs(10))),
            DenyAll,
            actuator,
            MemoryFeedback::new(),
        ));

        assert_send(tag_source(reader, Arc::clone(&dispatcher)));
        assert_send(code_source(
            Arc::new(Mutex::new(camera)),
            TextDecoder,
            dispatcher,
        ));
    }

    #[tokio::test]
    async fn test_read_one_skips_empty_reads() {
        let (mut reader, handle) = MockTagReader::new();
        handle.report_no_tag().await.unwrap();
        handle.report_no_tag().await.unwrap();
        handle
            .present_tag_with_text("584190912345", "alice")
            .await
            .unwrap();

        let read = read_one(&mut reader).await.unwrap();

        assert_eq!(read.id.unwrap().as_str(), "584190912345");
        assert_eq!(read.text, "alice");
    }

    #[tokio::test]
    async fn test_read_one_propagates_errors() {
        let (mut reader, handle) = MockTagReader::new();
        handle.inject_error("collision").await.unwrap();

        assert!(matches!(
            read_one(&mut reader).await,
            Err(HardwareError::ReadError { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pace_enforces_minimum_interval() {
        let started = Instant::now();
        pace(started).await;
        assert_eq!(started.elapsed(), Duration::from_millis(MIN_POLL_INTERVAL_MS));

        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(50)).await;
        pace(started).await;
        assert_eq!(started.elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn test_error_streak_resets() {
        let mut streak = ErrorStreak::default();
        let error = HardwareError::read("crc");

        streak.record("tag", &error);
        streak.record("tag", &error);
        assert_eq!(streak.consecutive, 2);

        streak.reset("tag");
        assert_eq!(streak.consecutive, 0);
    }
}
