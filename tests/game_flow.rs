//! End-to-end playthrough against a freshly seeded database

use tictictomb::{
    Dataset, DatasetScripts, GameEngine, GameOptions, QueryRejection, Stage, Submission,
    VerificationOutcome,
};
use tempfile::TempDir;

const LOCATE_QUERY: &str = "
SELECT *
FROM bombs
WHERE signal_strength > 95
  AND battery_level > 90
  AND device_signature LIKE 'B9Z%'
ORDER BY last_maintained DESC;";

const DEFUSE_QUERY: &str = "
SELECT bc.bomb_id, bc.component_name, bc.material, bc.activation_code
FROM bomb_components bc
JOIN bombs b ON bc.bomb_id = b.bomb_id
WHERE b.location = 'Airport'
  AND bc.component_name IN ('Detonator', 'Circuit')
  AND bc.material IN ('Titanium', 'Gold');";

const CULPRIT_QUERY: &str = "
SELECT s.name, a.action_performed, a.bomb_id, b.location
FROM suspects s
JOIN access_logs a ON s.suspect_id = a.suspect_id
JOIN bombs b ON a.bomb_id = b.bomb_id
WHERE a.action_performed = 'Installation';";

fn new_game(options: GameOptions) -> (TempDir, GameEngine) {
    let temp_dir = TempDir::new().unwrap();
    let dataset = Dataset::bootstrap(
        temp_dir.path().join("tictictomb.db"),
        &DatasetScripts::embedded(),
        false,
    )
    .unwrap();
    (temp_dir, GameEngine::new(dataset, options))
}

fn assert_satisfied(submission: Submission) {
    match submission {
        Submission::Executed { evaluation, .. } => assert!(evaluation.satisfied),
        other => panic!("expected an executed query, got {:?}", other),
    }
}

#[test]
fn test_full_mission_with_verification() {
    let (_dir, mut game) = new_game(GameOptions::default());

    assert_satisfied(game.submit(LOCATE_QUERY).unwrap());
    assert_eq!(game.session().target_id, Some(2));
    assert_eq!(game.verify("Train Station").unwrap(), VerificationOutcome::Incorrect);
    assert_eq!(
        game.verify("Airport").unwrap(),
        VerificationOutcome::Advanced(Stage::DefuseBomb)
    );

    assert_satisfied(game.submit(DEFUSE_QUERY).unwrap());
    assert_eq!(
        game.verify("221").unwrap(),
        VerificationOutcome::Advanced(Stage::FindCulprit)
    );

    assert_satisfied(game.submit(CULPRIT_QUERY).unwrap());
    assert_eq!(
        game.verify("Sarah Connor").unwrap(),
        VerificationOutcome::Advanced(Stage::Completed)
    );

    assert!(game.is_completed());
    assert_eq!(game.session().clues.len(), 3);
    assert!(game.brief().is_none());
    assert!(game.submit("SELECT 1").is_err());
}

#[test]
fn test_full_mission_without_verification() {
    let (_dir, mut game) = new_game(GameOptions {
        require_verification: false,
        ..GameOptions::default()
    });

    for query in [LOCATE_QUERY, DEFUSE_QUERY, CULPRIT_QUERY] {
        assert_satisfied(game.submit(query).unwrap());
    }
    assert!(game.is_completed());
}

#[test]
fn test_decoy_rows_do_not_complete_stage() {
    let (_dir, mut game) = new_game(GameOptions::default());

    // Airport Parking Garage and the other near misses only
    let submission = game
        .submit("SELECT * FROM bombs WHERE bomb_id <> 2")
        .unwrap();
    match submission {
        Submission::Executed { output, evaluation, .. } => {
            assert_eq!(output.row_count(), 7);
            assert!(!evaluation.satisfied);
        }
        other => panic!("expected an executed query, got {:?}", other),
    }
    assert!(!game.awaiting_verification());
    assert!(game.session().clues.is_empty());
}

#[test]
fn test_gate_rejections_leave_session_untouched() {
    let (_dir, mut game) = new_game(GameOptions::default());

    let cases = [
        ("DELETE FROM bombs", QueryRejection::NotSelect),
        (
            "SELECT * FROM bombs; DROP TABLE bombs",
            QueryRejection::ForbiddenKeyword("drop".to_string()),
        ),
        (
            "SELECT name FROM sqlite_master",
            QueryRejection::SystemCatalog("sqlite_master".to_string()),
        ),
        ("SELECT * FROM bombs --", QueryRejection::CommentMarker),
    ];

    for (query, expected) in cases {
        assert_eq!(game.submit(query).unwrap(), Submission::Rejected(expected));
    }
    assert_eq!(game.session().stage, Stage::LocateBomb);

    let rows = game.dataset().run_query("SELECT COUNT(*) AS n FROM bombs").unwrap();
    assert_eq!(rows.rows[0].integer("n"), Some(8));
}
