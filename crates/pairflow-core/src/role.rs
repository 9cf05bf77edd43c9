// SPDX-License-Identifier: MIT

//! The two turn-taking roles in a bubble.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Implementer,
    Reviewer,
}

impl Role {
    /// The other role. Used by the role-swap rule on `pass` and `revise`.
    pub fn swapped(self) -> Role {
        match self {
            Role::Implementer => Role::Reviewer,
            Role::Reviewer => Role::Implementer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Implementer => write!(f, "implementer"),
            Role::Reviewer => write!(f, "reviewer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_is_an_involution() {
        assert_eq!(Role::Implementer.swapped(), Role::Reviewer);
        assert_eq!(Role::Reviewer.swapped(), Role::Implementer);
        assert_eq!(Role::Implementer.swapped().swapped(), Role::Implementer);
    }
}
