//! Mission stages
//!
//! Stages proceed strictly 1 → 2 → 3 → completed; no regression, no skipping.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Identify the real bomb among the decoys
    LocateBomb,
    /// Find the defusal code on the bomb's critical component
    DefuseBomb,
    /// Trace the installation back to a suspect
    FindCulprit,
    Completed,
}

impl Stage {
    pub const FIRST: Stage = Stage::LocateBomb;

    /// Playable stages in order
    pub const ALL: [Stage; 3] = [Stage::LocateBomb, Stage::DefuseBomb, Stage::FindCulprit];

    pub fn from_number(number: u8) -> Option<Stage> {
        match number {
            1 => Some(Stage::LocateBomb),
            2 => Some(Stage::DefuseBomb),
            3 => Some(Stage::FindCulprit),
            _ => None,
        }
    }

    /// Stage number 1..=3; `None` once completed
    pub fn number(self) -> Option<u8> {
        match self {
            Stage::LocateBomb => Some(1),
            Stage::DefuseBomb => Some(2),
            Stage::FindCulprit => Some(3),
            Stage::Completed => None,
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::LocateBomb => Some(Stage::DefuseBomb),
            Stage::DefuseBomb => Some(Stage::FindCulprit),
            Stage::FindCulprit => Some(Stage::Completed),
            Stage::Completed => None,
        }
    }

    pub fn is_completed(self) -> bool {
        self == Stage::Completed
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::FIRST
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "Stage {}", n),
            None => write!(f, "Completed"),
        }
    }
}
