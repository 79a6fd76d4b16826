//! Legacy positional-row matching
//!
//! Compatibility shim for callers that hand over bare positional rows with no
//! column names. It searches the printed form of each row for the puzzle's
//! literal fragments instead of comparing fields, so it is strictly weaker
//! than `matcher` and can be fooled by a value landing in the wrong column.
//! Rows produced by `dataset` always carry column names and never come here.

use crate::matcher::{Evaluation, StateDelta};
use crate::puzzle::Puzzle;
use crate::row::SqlValue;
use crate::stage::Stage;
use itertools::Itertools;

/// Printed rows of the target bomb carry more of the signature than the prefix
const SIGNATURE_FRAGMENT: &str = "B9Z31";

/// Tuple-style rendering: `(2, 'Airport', None)`
fn printed(row: &[SqlValue]) -> String {
    let body = row
        .iter()
        .map(|value| match value {
            SqlValue::Null => "None".to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => format!("{:?}", f),
            SqlValue::Text(s) => format!("'{}'", s),
        })
        .join(", ");
    format!("({})", body)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn matches_printed(puzzle: &Puzzle, stage: Stage, printed: &str) -> bool {
    match stage {
        Stage::LocateBomb => {
            printed.contains(puzzle.device.location_contains)
                && printed.contains(SIGNATURE_FRAGMENT)
                && printed.contains(puzzle.device.maintained_on)
                && printed.contains(puzzle.device.frequency_run)
        }
        Stage::DefuseBomb => {
            printed.contains(puzzle.component.activation_code)
                && contains_any(printed, puzzle.component.component_names)
                && contains_any(printed, puzzle.component.materials)
        }
        Stage::FindCulprit => {
            printed.contains(puzzle.culprit.name)
                && printed.contains(puzzle.culprit.action)
                && printed.contains(puzzle.culprit.location_contains)
        }
        Stage::Completed => false,
    }
}

/// Evaluate positional rows against the standard puzzle.
///
/// On a stage 1 match the first value of the matching row is taken as the
/// bomb id when it is an integer.
pub fn evaluate_positional(stage: u8, rows: &[Vec<SqlValue>]) -> Evaluation {
    let puzzle = Puzzle::standard();
    let Some(stage) = Stage::from_number(stage) else {
        return Evaluation::unsatisfied();
    };

    let matched = rows
        .iter()
        .find(|row| matches_printed(&puzzle, stage, &printed(row)));

    match matched {
        Some(row) => {
            let target_id = match stage {
                Stage::LocateBomb => row.first().and_then(SqlValue::as_i64),
                _ => None,
            };
            Evaluation::satisfied(StateDelta {
                target_id,
                clue: puzzle.clue(stage).map(str::to_string),
            })
        }
        None => Evaluation::unsatisfied(),
    }
}
