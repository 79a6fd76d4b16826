//! Session State
//!
//! The player's progress, passed explicitly between the game loop and the
//! matcher's caller. Only three things mutate it: applying a matcher delta,
//! a successful verification, and a restart (which replaces it outright).

use crate::error::{GameError, Result};
use crate::matcher::StateDelta;
use crate::puzzle::Puzzle;
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    pub stage: Stage,
    /// Append-only; each distinct clue at most once
    pub clues: Vec<String>,
    pub target_id: Option<i64>,
    /// Stage whose finding awaits the player's confirmation
    pub pending_verification: Option<Stage>,
    pub started_at: DateTime<Utc>,
}

/// Result of checking a verification answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Answer accepted; the session moved to this stage
    Advanced(Stage),
    Incorrect,
    /// The clock ran out before the answer arrived; the session was reset
    TimeUp,
}

impl SessionState {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stage: Stage::FIRST,
            clues: Vec::new(),
            target_id: None,
            pending_verification: None,
            started_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.stage.is_completed()
    }

    /// Record the facts from a matcher delta. Returns whether anything changed.
    pub fn apply(&mut self, delta: &StateDelta) -> bool {
        let mut changed = false;

        if let Some(target_id) = delta.target_id {
            if self.target_id != Some(target_id) {
                self.target_id = Some(target_id);
                changed = true;
            }
        }

        if let Some(clue) = &delta.clue {
            if !self.clues.iter().any(|known| known == clue) {
                self.clues.push(clue.clone());
                changed = true;
            }
        }

        changed
    }

    /// Mark the current stage's finding as awaiting confirmation
    pub fn begin_verification(&mut self) -> Result<()> {
        if self.is_completed() {
            return Err(GameError::Session(
                "mission already completed; nothing to verify".to_string(),
            ));
        }
        self.pending_verification = Some(self.stage);
        Ok(())
    }

    /// Check the player's answer for the pending finding. A correct answer
    /// (surrounding whitespace ignored) advances the stage.
    pub fn verify(&mut self, puzzle: &Puzzle, answer: &str) -> Result<VerificationOutcome> {
        let stage = self.pending_verification.ok_or_else(|| {
            GameError::Session("no finding is awaiting verification".to_string())
        })?;

        let expected = puzzle.expected_answer(stage).ok_or_else(|| {
            GameError::Session(format!("{} has no verification answer", stage))
        })?;

        if answer.trim() != expected {
            return Ok(VerificationOutcome::Incorrect);
        }

        self.pending_verification = None;
        let next = self.advance()?;
        Ok(VerificationOutcome::Advanced(next))
    }

    /// Move to the next stage
    pub fn advance(&mut self) -> Result<Stage> {
        let next = self.stage.next().ok_or_else(|| {
            GameError::Session("mission already completed".to_string())
        })?;
        info!("Session {} advanced from {} to {}", self.id, self.stage, next);
        self.stage = next;
        Ok(next)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
