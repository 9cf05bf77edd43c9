// SPDX-License-Identifier: MIT

pub mod agent;
pub mod bubble;
pub mod human;
pub mod ui;

/// Shared `--id` parser: surfaces `InvalidBubbleId` as a message clap can
/// print directly, rather than its `Debug` form.
pub fn parse_bubble_id(s: &str) -> Result<pairflow_core::id::BubbleId, String> {
    pairflow_core::id::BubbleId::try_from(s).map_err(|e| e.to_string())
}
