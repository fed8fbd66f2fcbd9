//! Credential intake and verification dispatch for the doorway gate.
//!
//! Two sources feed one decision pipeline:
//!
//! ```text
//! ┌────────────┐
//! │ Tag source │──┐
//! └────────────┘  │    ┌────────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────┐
//!                 ├───►│ Dispatcher │──►│ DebounceGate │──►│ Verifier │──►│ Actuator │
//! ┌─────────────┐ │    └────────────┘   └──────────────┘   └──────────┘   └──────────┘
//! │ Code source │─┘          │
//! └─────────────┘            └──► FeedbackSink (one line per gate-passing attempt)
//! ```
//!
//! Each source runs in its own task and awaits the dispatcher in-line, so
//! the lock-open delay blocks only the source that triggered it. The single
//! [`DebounceGate`] is the only state the two tasks share; it guarantees that
//! no two attempts pass closer together than the quiet period.
//!
//! The [`Supervisor`] owns the lifecycle: it spawns both sources, waits for
//! a shutdown signal, then releases the camera and drives every output low.

pub mod actuator;
pub mod debounce;
pub mod dispatcher;
pub mod error;
pub mod feedback;
pub mod source;
pub mod supervisor;
pub mod verifier;

pub use actuator::{Actuator, ActuatorGuard, BuzzerPattern};
pub use debounce::DebounceGate;
pub use dispatcher::Dispatcher;
pub use error::{GateError, Result};
pub use feedback::{ConsoleFeedback, FeedbackSink, MemoryFeedback};
pub use source::{code_source, read_one, tag_source};
pub use supervisor::{Peripherals, ShutdownSignal, Supervisor, SupervisorHandle};
pub use verifier::Verifier;
