//! Objective Matcher
//!
//! Decides whether the rows returned by an accepted query satisfy the current
//! stage's hidden objective. Pure: it neither stores nor advances the stage;
//! the caller applies the returned `StateDelta` and moves the session on.

use crate::puzzle::{columns, CulpritTrail, DefusalComponent, DeviceProfile, Puzzle};
use crate::row::Row;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};

/// Facts to record after a successful match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    /// Bomb id of the row that identified the target (stage 1 only)
    pub target_id: Option<i64>,
    pub clue: Option<String>,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.target_id.is_none() && self.clue.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub satisfied: bool,
    pub delta: StateDelta,
}

impl Evaluation {
    pub fn unsatisfied() -> Self {
        Self::default()
    }

    pub fn satisfied(delta: StateDelta) -> Self {
        Self {
            satisfied: true,
            delta,
        }
    }
}

/// A per-row acceptance predicate for one stage
pub trait StageObjective {
    fn matches(&self, row: &Row) -> bool;
}

fn above(row: &Row, column: &str, bound: i64) -> bool {
    row.number(column).map_or(false, |value| value > bound as f64)
}

fn equals_id(row: &Row, column: &str, id: i64) -> bool {
    row.number(column).map_or(false, |value| value == id as f64)
}

impl StageObjective for DeviceProfile {
    fn matches(&self, row: &Row) -> bool {
        row.text(columns::LOCATION).contains(self.location_contains)
            && above(row, columns::SIGNAL_STRENGTH, self.signal_strength_above)
            && above(row, columns::BATTERY_LEVEL, self.battery_level_above)
            && row.text(columns::FREQUENCY_PATTERN).contains(self.frequency_run)
            && row.text(columns::DEVICE_SIGNATURE).starts_with(self.signature_prefix)
            && row.text(columns::LAST_MAINTAINED).contains(self.maintained_on)
    }
}

impl StageObjective for DefusalComponent {
    fn matches(&self, row: &Row) -> bool {
        let component = row.text(columns::COMPONENT_NAME);
        let material = row.text(columns::MATERIAL);
        equals_id(row, columns::BOMB_ID, self.bomb_id)
            && row.text(columns::ACTIVATION_CODE) == self.activation_code
            && self.component_names.contains(&component.as_str())
            && self.materials.contains(&material.as_str())
    }
}

impl StageObjective for CulpritTrail {
    fn matches(&self, row: &Row) -> bool {
        row.text(columns::NAME) == self.name
            && row.text(columns::ACTION_PERFORMED) == self.action
            && (equals_id(row, columns::BOMB_ID, self.bomb_id)
                || row.text(columns::LOCATION).contains(self.location_contains))
    }
}

impl Puzzle {
    fn objective(&self, stage: Stage) -> Option<&dyn StageObjective> {
        match stage {
            Stage::LocateBomb => Some(&self.device),
            Stage::DefuseBomb => Some(&self.component),
            Stage::FindCulprit => Some(&self.culprit),
            Stage::Completed => None,
        }
    }

    /// Evaluate rows against this puzzle. Rows are scanned in order and the
    /// first qualifying row decides the delta.
    pub fn evaluate(&self, stage: u8, rows: &[Row]) -> Evaluation {
        let Some(stage) = Stage::from_number(stage) else {
            return Evaluation::unsatisfied();
        };
        let Some(objective) = self.objective(stage) else {
            return Evaluation::unsatisfied();
        };

        match rows.iter().find(|row| objective.matches(row)) {
            Some(row) => {
                let target_id = match stage {
                    Stage::LocateBomb => row.integer(columns::BOMB_ID),
                    _ => None,
                };
                Evaluation::satisfied(StateDelta {
                    target_id,
                    clue: self.clue(stage).map(str::to_string),
                })
            }
            None => Evaluation::unsatisfied(),
        }
    }
}

/// Evaluate rows against the standard puzzle
pub fn evaluate(stage: u8, rows: &[Row]) -> Evaluation {
    Puzzle::standard().evaluate(stage, rows)
}
