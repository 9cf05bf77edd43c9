// SPDX-License-Identifier: MIT

//! `--output {text,json}`: text for humans, json for tooling that consumes
//! `BubbleStatusView`/`BubbleListEntry` without re-deriving them from the
//! on-disk formats.

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
