//! Audit output: one line per gate-passing attempt.
//!
//! Feedback lines are a product of the gate, not diagnostics, so they do not
//! go through `tracing`. [`ConsoleFeedback`] prints them on stdout.

use doorway_core::FeedbackRecord;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives the feedback record of every gate-passing attempt.
pub trait FeedbackSink: Send + Sync {
    fn emit(&self, record: &FeedbackRecord);
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for Arc<S> {
    fn emit(&self, record: &FeedbackRecord) {
        (**self).emit(record);
    }
}

/// Prints each record on its own stdout line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFeedback;

impl FeedbackSink for ConsoleFeedback {
    fn emit(&self, record: &FeedbackRecord) {
        println!("{record}");
    }
}

/// Keeps records in memory, oldest first.
#[derive(Debug, Default)]
pub struct MemoryFeedback {
    records: Mutex<Vec<FeedbackRecord>>,
}

impl MemoryFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records emitted so far.
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FeedbackSink for MemoryFeedback {
    fn emit(&self, record: &FeedbackRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorway_core::{CredentialKind, VerificationOutcome};

    #[test]
    fn test_memory_feedback_keeps_order() {
        let sink = MemoryFeedback::new();
        sink.emit(&FeedbackRecord::now(
            CredentialKind::Tag,
            VerificationOutcome::Denied,
        ));
        sink.emit(&FeedbackRecord::now(
            CredentialKind::Code,
            VerificationOutcome::Accepted,
        ));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, CredentialKind::Tag);
        assert_eq!(records[1].outcome, VerificationOutcome::Accepted);
    }
}
