// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pairflow-core: shared types for the bubble lifecycle engine.
//!
//! This crate is pure — no filesystem or subprocess I/O. It defines the
//! identifiers, the envelope wire format, the config/state schemas, and the
//! error taxonomy that every other `pairflow-*` crate builds on.

pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod id;
pub mod role;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod watchdog;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AgentKind, BubbleConfig, LocalOverlayEntry, LocalOverlayMode, OverlayConfig};
pub use envelope::{Envelope, EnvelopeType, Participant, Payload};
pub use error::PairflowError;
pub use id::BubbleId;
pub use role::Role;
pub use state::{ActiveTurn, BubbleState, Lifecycle, RoundRoleEntry};
pub use watchdog::{watchdog_status, WatchdogStatus};
