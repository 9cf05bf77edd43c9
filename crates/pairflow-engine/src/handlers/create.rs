// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::config::{AgentsConfig, BubbleConfig};
use pairflow_core::envelope::{EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::BubbleState;
use pairflow_storage::BubblePaths;
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Creates a new bubble: config, `task.md` artifact, a `CREATED` state
    /// snapshot, and the round-0 TASK envelope. Fails if the bubble already
    /// has a `state.json` — the genesis write is what marks a bubble as
    /// fully created, so a crash between writing `bubble.toml`/appending the
    /// TASK envelope and writing the initial state is resumed rather than
    /// rejected as "already exists": the retry reuses the existing config
    /// and TASK envelope instead of duplicating either.
    pub async fn create(
        &self,
        repo_path: &Path,
        bubble_id: BubbleId,
        base_branch: &str,
        agents: AgentsConfig,
        task: &str,
    ) -> Result<BubbleConfig, PairflowError> {
        let paths = BubblePaths::resolve(repo_path, &bubble_id)?;
        paths.ensure_dirs()?;

        let lock_timeout = self.lock_timeout;
        let repo_path = repo_path.to_path_buf();
        let base_branch = base_branch.to_string();
        let task = task.to_string();
        let now = self.clock.now();

        with_bubble_lock(&paths.lock_file.clone(), lock_timeout, move || async move {
            if paths.state.exists() {
                return Err(PairflowError::ConfigInvalid(format!(
                    "bubble {bubble_id} already exists"
                )));
            }

            let config = if paths.config.exists() {
                let text = std::fs::read_to_string(&paths.config).map_err(|e| PairflowError::Io {
                    path: paths.config.clone(),
                    source: e,
                })?;
                BubbleConfig::from_toml_str(&text)?
            } else {
                let config = BubbleConfig::new(bubble_id.clone(), repo_path, base_branch, agents)?;
                std::fs::write(&paths.config, config.to_toml_string()?).map_err(|e| PairflowError::Io {
                    path: paths.config.clone(),
                    source: e,
                })?;
                config
            };

            if !paths.task_md.exists() {
                std::fs::write(&paths.task_md, &task).map_err(|e| PairflowError::Io {
                    path: paths.task_md.clone(),
                    source: e,
                })?;
            }

            let transcript = pairflow_storage::read_envelopes(&paths.transcript)?;
            let envelope = match transcript.into_iter().find(|e| e.envelope_type == EnvelopeType::Task) {
                Some(existing) => existing,
                None => {
                    let envelope = new_envelope(
                        bubble_id.clone(),
                        Participant::Orchestrator,
                        Participant::from(config.agents.implementer),
                        EnvelopeType::Task,
                        1,
                        now,
                        Payload {
                            summary: Some(task),
                            ..Payload::default()
                        },
                        Vec::new(),
                    );
                    record_envelope(&paths, &envelope)?;
                    envelope
                }
            };

            let mut state = BubbleState::new_created(bubble_id);
            state.last_envelope_id = Some(envelope.id);
            pairflow_storage::write_state_snapshot(&paths.state, None, None, &state)?;

            Ok(config)
        })
        .await
    }
}
