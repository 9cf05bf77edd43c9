// SPDX-License-Identifier: MIT

//! External-world adapters: the subprocesses and multiplexer sessions a
//! bubble's lifecycle drives but does not itself implement.

pub mod session;
pub mod subprocess;
pub mod workspace;

pub use session::{session_name, SessionAdapter, SessionError, TmuxAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSessionAdapter, SessionCall};
pub use workspace::{
    bootstrap_worktree, commit_worktree, has_external_artifacts, resolve_repo_root, teardown_worktree,
};
