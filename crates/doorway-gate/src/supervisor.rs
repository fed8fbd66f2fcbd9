//! Process lifecycle: start both sources, wait, tear down.
//!
//! # Lifecycle
//!
//! 1. Build a [`Supervisor`] from the peripherals, a verifier and a sink
//! 2. [`Supervisor::run`] installs the signal handlers and spawns one task
//!    per source into a `JoinSet`
//! 3. Ctrl-C or SIGTERM ends the wait
//! 4. Teardown, in this order: abort both sources without waiting for their
//!    in-flight reads, release the camera, drive every output low
//!
//! # Examples
//!
//! ```no_run
//! use doorway_core::Config;
//! use doorway_gate::{ConsoleFeedback, Peripherals, Supervisor};
//! use doorway_hardware::line::TextDecoder;
//! use doorway_hardware::mock::{MockCamera, MockPin, MockTagReader};
//! use doorway_hardware::{AnyFrameSource, AnyOutputPin, AnyTagReader};
//! use doorway_network::{VerificationClient, VerificationClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let (reader, _tags) = MockTagReader::new();
//!     let (camera, _codes) = MockCamera::new();
//!
//!     let peripherals = Peripherals {
//!         tag_reader: AnyTagReader::Mock(reader),
//!         camera: AnyFrameSource::Mock(camera),
//!         decoder: Box::new(TextDecoder),
//!         lock: AnyOutputPin::Mock(MockPin::new(config.lock.pin)),
//!         buzzer: AnyOutputPin::Mock(MockPin::new(config.buzzer.pin)),
//!     };
//!     let verifier = VerificationClient::new(VerificationClientConfig::default())?;
//!
//!     Supervisor::new(peripherals, verifier, ConsoleFeedback, &config)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

use crate::actuator::{Actuator, ActuatorGuard};
use crate::debounce::DebounceGate;
use crate::dispatcher::Dispatcher;
use crate::feedback::FeedbackSink;
use crate::source::{code_source, tag_source};
use crate::verifier::Verifier;
use crate::{GateError, Result};
use doorway_core::Config;
use doorway_hardware::{
    AnyFrameSource, AnyOutputPin, AnyTagReader, CodeDecoder, FrameSource, TagReader,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// The devices the gate drives.
pub struct Peripherals {
    pub tag_reader: AnyTagReader,
    pub camera: AnyFrameSource,
    pub decoder: Box<dyn CodeDecoder>,
    pub lock: AnyOutputPin,
    pub buzzer: AnyOutputPin,
}

type GateDispatcher<V, S> = Dispatcher<V, AnyOutputPin, S>;

/// Owns the gate until it is started.
pub struct Supervisor<V, S> {
    tag_reader: AnyTagReader,
    camera: AnyFrameSource,
    decoder: Box<dyn CodeDecoder>,
    dispatcher: Arc<GateDispatcher<V, S>>,
}

impl<V, S> Supervisor<V, S>
where
    V: Verifier + 'static,
    S: FeedbackSink + 'static,
{
    /// Wire the peripherals to one gate, one actuator and `verifier`.
    pub fn new(peripherals: Peripherals, verifier: V, feedback: S, config: &Config) -> Self {
        let Peripherals {
            tag_reader,
            camera,
            decoder,
            lock,
            buzzer,
        } = peripherals;

        let actuator = Arc::new(Actuator::from_config(lock, buzzer, config));
        let gate = Arc::new(DebounceGate::new(config.gate.quiet_period()));

        Self {
            tag_reader,
            camera,
            decoder,
            dispatcher: Arc::new(Dispatcher::new(gate, verifier, actuator, feedback)),
        }
    }

    pub fn dispatcher(&self) -> &Arc<GateDispatcher<V, S>> {
        &self.dispatcher
    }

    /// Spawn both sources and return the handle that tears them down.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SupervisorHandle<V, S> {
        let outputs = self.dispatcher.actuator().guard();
        let camera = Arc::new(Mutex::new(self.camera));

        info!(
            tag_reader = %self.tag_reader.info(),
            quiet_period = ?self.dispatcher.gate().quiet_period(),
            "Starting credential sources"
        );

        let mut tasks = JoinSet::new();
        tasks.spawn(tag_source(self.tag_reader, Arc::clone(&self.dispatcher)));
        tasks.spawn(code_source(
            Arc::clone(&camera),
            self.decoder,
            Arc::clone(&self.dispatcher),
        ));

        SupervisorHandle {
            tasks,
            camera,
            outputs,
            dispatcher: self.dispatcher,
            panicked: 0,
        }
    }

    /// Run until `shutdown` resolves, then tear down.
    ///
    /// # Errors
    ///
    /// Returns an error if the outputs could not be driven low or a source
    /// task panicked. Teardown runs in full either way.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let mut handle = self.start();

        tokio::select! {
            () = shutdown => info!("Shutdown requested"),
            Some(result) = handle.tasks.join_next() => handle.record_exit(result),
        }

        handle.shutdown().await
    }

    /// Run until Ctrl-C or SIGTERM, then tear down.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Signal` if the handlers cannot be installed, in
    /// which case no source is started, plus the errors of
    /// [`Supervisor::run_until`].
    pub async fn run(self) -> Result<()> {
        let signal = ShutdownSignal::install()?;
        self.run_until(signal.recv()).await
    }
}

/// A running gate.
#[derive(Debug)]
pub struct SupervisorHandle<V, S> {
    tasks: JoinSet<()>,
    camera: Arc<Mutex<AnyFrameSource>>,
    outputs: ActuatorGuard<AnyOutputPin>,
    dispatcher: Arc<GateDispatcher<V, S>>,
    panicked: usize,
}

impl<V, S> SupervisorHandle<V, S>
where
    V: Verifier + 'static,
    S: FeedbackSink + 'static,
{
    pub fn dispatcher(&self) -> &Arc<GateDispatcher<V, S>> {
        &self.dispatcher
    }

    /// Abort both sources, release the camera, then drive every output low.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Hardware` if an output could not be driven low,
    /// or `GateError::TaskPanicked` if a source task had panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            self.record_exit(result);
        }

        let Self {
            camera,
            outputs,
            panicked,
            ..
        } = self;

        camera.lock().await.release();
        info!("Camera released");

        outputs.release()?;
        info!("Outputs driven low");

        if panicked > 0 {
            return Err(GateError::TaskPanicked { count: panicked });
        }
        Ok(())
    }

    fn record_exit(&mut self, result: std::result::Result<(), JoinError>) {
        match result {
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                error!(error = %e, "Source task panicked");
                self.panicked += 1;
            }
            Ok(()) => warn!("Source task ended unexpectedly"),
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
///
/// Handlers are installed by [`ShutdownSignal::install`], before any source
/// starts, so a failure to install them keeps the gate from starting.
#[derive(Debug)]
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    /// # Errors
    ///
    /// Returns `GateError::Signal` if a handler cannot be registered.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let terminate = signal(SignalKind::terminate()).map_err(GateError::Signal)?;
            Ok(Self { terminate })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the first shutdown signal.
    pub async fn recv(self) {
        #[cfg(unix)]
        {
            let mut terminate = self.terminate;
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = %e, "Ctrl-C listener failed, shutting down");
                    }
                }
                _ = terminate.recv() => info!("SIGTERM received"),
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Ctrl-C listener failed, shutting down");
            }
        }
    }
}
