// SPDX-License-Identifier: MIT

//! Bubble identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated bubble identifier, matching `^b_[A-Za-z0-9_]+$`.
///
/// Unlike most newtype IDs in this codebase, `BubbleId` is never constructed
/// from an unchecked string outside of [`BubbleId::parse`] / [`TryFrom`] —
/// the format is load-bearing (it is the directory name under
/// `.pairflow/bubbles/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BubbleId(String);

/// A bubble ID did not match `^b_[A-Za-z0-9_]+$`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bubble id {0:?}: must match ^b_[A-Za-z0-9_]+$")]
pub struct InvalidBubbleId(pub String);

impl BubbleId {
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidBubbleId> {
        let s = s.into();
        if is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(InvalidBubbleId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bubble branch name derived from this id: `bubble/<id>`.
    pub fn branch_name(&self) -> String {
        format!("bubble/{}", self.0)
    }
}

fn is_valid(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("b_") else {
        return false;
    };
    !rest.is_empty()
        && rest
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BubbleId {
    type Error = InvalidBubbleId;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for BubbleId {
    type Error = InvalidBubbleId;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for BubbleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq<str> for BubbleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::borrow::Borrow<str> for BubbleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
