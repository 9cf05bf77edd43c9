// SPDX-License-Identifier: MIT

//! Filesystem persistence for the bubble lifecycle engine: path layout,
//! the per-bubble exclusive lock, append-only envelope logs, and the
//! compare-and-swap `state.json` store. Nothing in this crate knows about
//! git, tmux, or agent subprocesses — those live in `pairflow-adapters`.

pub mod envelope_log;
pub mod lock;
pub mod metrics;
pub mod paths;
pub mod registry;
pub mod state_store;

pub use envelope_log::{append_envelope, pending_inbox_items, read_envelopes};
pub use lock::with_file_lock;
pub use metrics::emit_envelope_event;
pub use paths::BubblePaths;
pub use registry::{read_registry, write_registry, SessionRecord, SessionRegistry};
pub use state_store::{read_state_snapshot, write_state_snapshot, StateSnapshot};
