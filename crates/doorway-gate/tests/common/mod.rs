//! Shared fixtures for the gate integration tests.

#![allow(dead_code)]

use doorway_core::{Config, Credential};
use doorway_gate::{MemoryFeedback, Peripherals, Supervisor, SupervisorHandle, Verifier};
use doorway_hardware::line::TextDecoder;
use doorway_hardware::mock::{MockCamera, MockCameraHandle, MockPin, MockTagReader, MockTagReaderHandle};
use doorway_hardware::{AnyFrameSource, AnyOutputPin, AnyTagReader};
use doorway_network::{StatusCode, Verification, VerificationError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How the scripted authority answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// 200 for allowed credentials, 403 otherwise.
    Normal,
    /// Every request times out.
    Unreachable,
}

/// Authority stand-in with a fixed allow list and optional latency.
#[derive(Debug)]
pub struct ScriptedVerifier {
    allowed: Vec<Credential>,
    answer: Answer,
    latency: Duration,
    calls: Mutex<Vec<(Instant, Credential)>>,
}

impl ScriptedVerifier {
    pub fn allowing(allowed: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            answer: Answer::Normal,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: Answer::Unreachable,
            ..Self::allowing([])
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<Credential> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, credential)| credential.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

impl Verifier for ScriptedVerifier {
    async fn verify(&self, credential: &Credential) -> Verification {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), credential.clone()));
        tokio::time::sleep(self.latency).await;

        match self.answer {
            Answer::Unreachable => Verification::Unavailable(VerificationError::Timeout(3000)),
            Answer::Normal if self.allowed.contains(credential) => Verification::Accepted,
            Answer::Normal => Verification::Rejected {
                status: StatusCode::FORBIDDEN,
            },
        }
    }
}

/// A started gate on mock hardware, with every handle a test inspects.
pub struct Rig {
    pub tags: MockTagReaderHandle,
    pub codes: MockCameraHandle,
    pub lock: MockPin,
    pub buzzer: MockPin,
    pub verifier: Arc<ScriptedVerifier>,
    pub feedback: Arc<MemoryFeedback>,
    pub handle: SupervisorHandle<Arc<ScriptedVerifier>, Arc<MemoryFeedback>>,
}

pub fn start(verifier: ScriptedVerifier, config: &Config) -> Rig {
    let (reader, tags) = MockTagReader::new();
    start_with_reader(AnyTagReader::Mock(reader), tags, verifier, config)
}

pub fn start_with_reader(
    tag_reader: AnyTagReader,
    tags: MockTagReaderHandle,
    verifier: ScriptedVerifier,
    config: &Config,
) -> Rig {
    let (camera, codes) = MockCamera::new();
    let lock = MockPin::new(config.lock.pin);
    let buzzer = MockPin::new(config.buzzer.pin);
    let verifier = Arc::new(verifier);
    let feedback = Arc::new(MemoryFeedback::new());

    let peripherals = Peripherals {
        tag_reader,
        camera: AnyFrameSource::Mock(camera),
        decoder: Box::new(TextDecoder),
        lock: AnyOutputPin::Mock(lock.clone()),
        buzzer: AnyOutputPin::Mock(buzzer.clone()),
    };

    let handle = Supervisor::new(
        peripherals,
        Arc::clone(&verifier),
        Arc::clone(&feedback),
        config,
    )
    .start();

    Rig {
        tags,
        codes,
        lock,
        buzzer,
        verifier,
        feedback,
        handle,
    }
}

/// Let the spawned sources run for `duration` of (paused) time.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
