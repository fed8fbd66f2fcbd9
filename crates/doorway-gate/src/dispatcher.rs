//! The single decision pipeline both sources feed.
//!
//! # Attempt Flow
//!
//! ```text
//! credential ─► empty? ──yes──► dropped (silent)
//!                 │no
//!                 ▼
//!           gate.try_acquire ──closed──► dropped (trace only)
//!                 │open
//!                 ▼
//!            verifier.verify
//!                 │
//!        ┌────────┴────────┐
//!     Accepted           Denied / Rejected / Unavailable
//!        │                 │
//!   record "accepted"   record "denied"
//!   approved sequence   denied sequence
//! ```

use crate::actuator::Actuator;
use crate::debounce::DebounceGate;
use crate::feedback::FeedbackSink;
use crate::verifier::Verifier;
use doorway_core::{Credential, FeedbackRecord, VerificationOutcome};
use doorway_hardware::OutputPin;
use doorway_network::Verification;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Instrument, error, info, info_span, trace, warn};
use uuid::Uuid;

/// Routes credentials through gate, verifier and actuator.
///
/// Shared by both sources behind an `Arc`; all collaborators are themselves
/// safe for concurrent use.
#[derive(Debug)]
pub struct Dispatcher<V, P, S> {
    gate: Arc<DebounceGate>,
    verifier: V,
    actuator: Arc<Actuator<P>>,
    feedback: S,
}

impl<V, P, S> Dispatcher<V, P, S>
where
    V: Verifier,
    P: OutputPin,
    S: FeedbackSink,
{
    pub fn new(
        gate: Arc<DebounceGate>,
        verifier: V,
        actuator: Arc<Actuator<P>>,
        feedback: S,
    ) -> Self {
        Self {
            gate,
            verifier,
            actuator,
            feedback,
        }
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    pub fn actuator(&self) -> &Arc<Actuator<P>> {
        &self.actuator
    }

    /// Process one raw read.
    ///
    /// Returns the feedback record if the attempt passed the gate, `None` if
    /// it was empty or arrived inside the quiet period. Resolves only once
    /// the actuation sequence has finished, so an accepted attempt holds the
    /// caller for the whole lock-open duration.
    pub async fn handle(&self, credential: Credential) -> Option<FeedbackRecord> {
        if credential.is_empty() {
            return None;
        }

        let kind = credential.kind();
        if !self.gate.try_acquire(Instant::now()) {
            trace!(%kind, "Attempt inside quiet period dropped");
            return None;
        }

        let span = info_span!("attempt", id = %Uuid::new_v4(), %kind);
        self.process(credential).instrument(span).await
    }

    async fn process(&self, credential: Credential) -> Option<FeedbackRecord> {
        let verification = self.verifier.verify(&credential).await;
        match &verification {
            Verification::Accepted => info!("Access granted"),
            Verification::Rejected { status } => info!(%status, "Access denied by authority"),
            Verification::Unavailable(e) => warn!(error = %e, "Authority unavailable, access denied"),
        }

        let outcome = verification.outcome();
        let record = FeedbackRecord::now(credential.kind(), outcome);
        self.feedback.emit(&record);

        let actuation = match outcome {
            VerificationOutcome::Accepted => self.actuator.approved().await,
            VerificationOutcome::Denied => self.actuator.denied().await,
        };
        if let Err(e) = actuation {
            error!(error = %e, %outcome, "Actuation failed");
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::MemoryFeedback;
    use doorway_core::CredentialKind;
    use doorway_hardware::mock::MockPin;
    use doorway_network::{StatusCode, VerificationError};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Accepts exactly the listed credentials and counts calls.
    #[derive(Default)]
    struct AllowList {
        allowed: Vec<Credential>,
        calls: Mutex<Vec<Credential>>,
        unavailable: bool,
    }

    impl Verifier for AllowList {
        async fn verify(&self, credential: &Credential) -> Verification {
            self.calls.lock().unwrap().push(credential.clone());
            if self.unavailable {
                Verification::Unavailable(VerificationError::Timeout(3000))
            } else if self.allowed.contains(credential) {
                Verification::Accepted
            } else {
                Verification::Rejected {
                    status: StatusCode::FORBIDDEN,
                }
            }
        }
    }

    struct Fixture {
        dispatcher: Dispatcher<Arc<AllowList>, MockPin, Arc<MemoryFeedback>>,
        verifier: Arc<AllowList>,
        feedback: Arc<MemoryFeedback>,
        lock: MockPin,
        buzzer: MockPin,
    }

    fn fixture(verifier: AllowList) -> Fixture {
        let lock = MockPin::new(26);
        let buzzer = MockPin::new(16);
        let actuator = Arc::new(Actuator::new(
            lock.clone(),
            buzzer.clone(),
            Duration::from_secs(2),
        ));
        let verifier = Arc::new(verifier);
        let feedback = Arc::new(MemoryFeedback::new());
        let dispatcher = Dispatcher::new(
            Arc::new(DebounceGate::new(Duration::from_secs(10))),
            Arc::clone(&verifier),
            actuator,
            Arc::clone(&feedback),
        );
        Fixture {
            dispatcher,
            verifier,
            feedback,
            lock,
            buzzer,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_tag_opens_lock() {
        let f = fixture(AllowList {
            allowed: vec![Credential::tag("584190912345")],
            ..Default::default()
        });

        let record = f.dispatcher.handle(Credential::tag("584190912345")).await.unwrap();

        assert_eq!(record.kind, CredentialKind::Tag);
        assert_eq!(record.outcome, VerificationOutcome::Accepted);
        assert_eq!(f.feedback.records(), vec![record]);
        assert_eq!(f.lock.high_periods(), vec![Duration::from_secs(2)]);
        assert_eq!(f.buzzer.high_pulses(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_code_buzzes_only() {
        let f = fixture(AllowList::default());

        let record = f.dispatcher.handle(Credential::code("forged")).await.unwrap();

        assert_eq!(record.kind, CredentialKind::Code);
        assert_eq!(record.outcome, VerificationOutcome::Denied);
        assert!(!f.lock.was_energized());
        assert_eq!(f.buzzer.high_periods(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_authority_is_denied() {
        let f = fixture(AllowList {
            allowed: vec![Credential::tag("584190912345")],
            unavailable: true,
            ..Default::default()
        });

        let record = f.dispatcher.handle(Credential::tag("584190912345")).await.unwrap();

        assert_eq!(record.outcome, VerificationOutcome::Denied);
        assert!(!f.lock.was_energized());
        assert_eq!(f.buzzer.high_periods(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_credentials_ignored_without_consuming_gate() {
        let f = fixture(AllowList::default());

        assert!(f.dispatcher.handle(Credential::tag("  ")).await.is_none());
        assert!(f.dispatcher.handle(Credential::code("")).await.is_none());
        assert!(f.verifier.calls.lock().unwrap().is_empty());

        // Gate still open for the first real attempt.
        assert!(f.dispatcher.handle(Credential::code("token")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_code_payload_is_verified_and_denied() {
        let f = fixture(AllowList::default());

        let record = f.dispatcher.handle(Credential::code(" \t")).await.unwrap();

        assert_eq!(record.outcome, VerificationOutcome::Denied);
        assert_eq!(*f.verifier.calls.lock().unwrap(), vec![Credential::code(" \t")]);
        assert_eq!(f.buzzer.high_periods(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_rejection_has_no_side_effects() {
        let f = fixture(AllowList::default());

        assert!(f.dispatcher.handle(Credential::tag("1")).await.is_some());
        let buzzer_writes = f.buzzer.history().len();

        assert!(f.dispatcher.handle(Credential::tag("2")).await.is_none());

        assert_eq!(f.verifier.calls.lock().unwrap().len(), 1);
        assert_eq!(f.feedback.records().len(), 1);
        assert_eq!(f.buzzer.history().len(), buzzer_writes);
        assert!(f.lock.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_actuation_failure_still_emits_record() {
        let f = fixture(AllowList {
            allowed: vec![Credential::tag("7")],
            ..Default::default()
        });
        f.lock.set_failing(true);

        let record = f.dispatcher.handle(Credential::tag("7")).await;

        assert_eq!(record.unwrap().outcome, VerificationOutcome::Accepted);
        assert_eq!(f.feedback.records().len(), 1);
    }
}
