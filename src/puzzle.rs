//! Puzzle Content
//!
//! The hidden answers of the three stages as data. Column names and literal
//! values here must agree with the seed dataset under `database/`.

use crate::stage::Stage;

/// Column names the objectives read
pub mod columns {
    pub const BOMB_ID: &str = "bomb_id";
    pub const LOCATION: &str = "location";
    pub const SIGNAL_STRENGTH: &str = "signal_strength";
    pub const BATTERY_LEVEL: &str = "battery_level";
    pub const FREQUENCY_PATTERN: &str = "frequency_pattern";
    pub const DEVICE_SIGNATURE: &str = "device_signature";
    pub const LAST_MAINTAINED: &str = "last_maintained";
    pub const COMPONENT_NAME: &str = "component_name";
    pub const MATERIAL: &str = "material";
    pub const ACTIVATION_CODE: &str = "activation_code";
    pub const NAME: &str = "name";
    pub const ACTION_PERFORMED: &str = "action_performed";
}

/// Stage 1: the signature of the real bomb
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub location_contains: &'static str,
    /// Strict lower bound
    pub signal_strength_above: i64,
    /// Strict lower bound
    pub battery_level_above: i64,
    pub frequency_run: &'static str,
    pub signature_prefix: &'static str,
    pub maintained_on: &'static str,
}

/// Stage 2: the component that disarms the target bomb
#[derive(Debug, Clone, PartialEq)]
pub struct DefusalComponent {
    pub bomb_id: i64,
    pub activation_code: &'static str,
    pub component_names: &'static [&'static str],
    pub materials: &'static [&'static str],
}

/// Stage 3: who installed the target bomb
#[derive(Debug, Clone, PartialEq)]
pub struct CulpritTrail {
    pub name: &'static str,
    pub action: &'static str,
    pub bomb_id: i64,
    pub location_contains: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub device: DeviceProfile,
    pub component: DefusalComponent,
    pub culprit: CulpritTrail,
    pub clues: [&'static str; 3],
}

const TARGET_BOMB_ID: i64 = 2;
const TARGET_LOCATION: &str = "Airport";

impl Puzzle {
    /// The puzzle shipped with the seed dataset
    pub fn standard() -> Self {
        Self {
            device: DeviceProfile {
                location_contains: TARGET_LOCATION,
                signal_strength_above: 95,
                battery_level_above: 90,
                frequency_run: "3.7,3.7,3.7",
                signature_prefix: "B9Z",
                maintained_on: "2025-03-08",
            },
            component: DefusalComponent {
                bomb_id: TARGET_BOMB_ID,
                activation_code: "221",
                component_names: &["Detonator", "Circuit"],
                materials: &["Titanium", "Gold"],
            },
            culprit: CulpritTrail {
                name: "Sarah Connor",
                action: "Installation",
                bomb_id: TARGET_BOMB_ID,
                location_contains: TARGET_LOCATION,
            },
            clues: [
                "Stage 1 complete: Bomb identified",
                "Stage 2 complete: Defusal mechanism found",
                "Stage 3 complete: Suspect identified",
            ],
        }
    }

    /// Clue recorded when the stage's objective is met
    pub fn clue(&self, stage: Stage) -> Option<&'static str> {
        stage
            .number()
            .map(|n| self.clues[usize::from(n) - 1])
    }

    /// Answer the player must give to confirm a finding
    pub fn expected_answer(&self, stage: Stage) -> Option<&'static str> {
        match stage {
            Stage::LocateBomb => Some(self.device.location_contains),
            Stage::DefuseBomb => Some(self.component.activation_code),
            Stage::FindCulprit => Some(self.culprit.name),
            Stage::Completed => None,
        }
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_per_stage() {
        let puzzle = Puzzle::standard();
        assert_eq!(puzzle.expected_answer(Stage::LocateBomb), Some("Airport"));
        assert_eq!(puzzle.expected_answer(Stage::DefuseBomb), Some("221"));
        assert_eq!(puzzle.expected_answer(Stage::FindCulprit), Some("Sarah Connor"));
        assert_eq!(puzzle.expected_answer(Stage::Completed), None);
    }

    #[test]
    fn test_clues_are_distinct() {
        let puzzle = Puzzle::standard();
        let clues: Vec<_> = Stage::ALL.iter().filter_map(|s| puzzle.clue(*s)).collect();
        assert_eq!(clues.len(), 3);
        assert_ne!(clues[0], clues[1]);
        assert_ne!(clues[1], clues[2]);
        assert_eq!(puzzle.clue(Stage::Completed), None);
    }
}
