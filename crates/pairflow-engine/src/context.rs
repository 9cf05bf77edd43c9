// SPDX-License-Identifier: MIT

//! Loads the immutable pieces a handler needs before it can touch a bubble:
//! its path layout and its `bubble.toml`.

use pairflow_core::config::BubbleConfig;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_storage::BubblePaths;
use std::path::Path;

/// Path layout plus parsed config for one bubble, resolved once per
/// handler invocation.
pub struct BubbleContext {
    pub paths: BubblePaths,
    pub config: BubbleConfig,
}

impl BubbleContext {
    pub fn load(repo_path: &Path, bubble_id: &BubbleId) -> Result<Self, PairflowError> {
        let paths = BubblePaths::resolve(repo_path, bubble_id)?;
        if !paths.config.exists() {
            return Err(PairflowError::BubbleNotFound(bubble_id.to_string()));
        }
        let text = std::fs::read_to_string(&paths.config).map_err(|e| PairflowError::Io {
            path: paths.config.clone(),
            source: e,
        })?;
        let config = BubbleConfig::from_toml_str(&text)?;
        Ok(Self { paths, config })
    }
}
