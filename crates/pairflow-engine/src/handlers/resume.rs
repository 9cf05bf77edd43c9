// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use std::path::Path;

/// Default message `bubble resume` sends when the caller doesn't supply one.
pub const DEFAULT_RESUME_MESSAGE: &str = "Please continue.";

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Convenience wrapper over [`Engine::human_reply`] with the default
    /// resume text, for the operator who just wants the bubble moving again
    /// without composing a reply.
    pub async fn resume(&self, repo_path: &Path, bubble_id: &BubbleId) -> Result<(), PairflowError> {
        self.human_reply(repo_path, bubble_id, DEFAULT_RESUME_MESSAGE).await
    }
}
