// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pairflow-engine: the protocol handlers (spec §4.I).
//!
//! Every handler follows the same skeleton: resolve the bubble's paths and
//! config, acquire the bubble lock, read the state snapshot, validate the
//! precondition, append transcript/inbox envelope(s), CAS-write the new
//! state, release the lock. [`Engine`] composes the one thing every handler
//! needs beyond that (a multiplexer session adapter and a clock) so the
//! handlers themselves stay free functions dispatched as `impl` blocks on it.

mod adapter_errors;
mod context;
mod engine;
mod handlers;
mod lock_bridge;
mod protocol;
mod recovery;

pub use engine::{Engine, DEFAULT_LOCK_TIMEOUT};
pub use handlers::reconcile::{ReconcileOutcome, StaleEntry, StaleReason};
pub use handlers::status::{BubbleListEntry, BubbleStatusView, InboxCounts, TranscriptSummary};
pub use handlers::resume::DEFAULT_RESUME_MESSAGE;
