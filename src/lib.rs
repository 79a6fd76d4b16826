pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod game;
pub mod legacy;
pub mod matcher;
pub mod narrative;
pub mod puzzle;
pub mod query_gate;
pub mod row;
pub mod session;
pub mod stage;

pub use clock::{format_clock, Countdown, Urgency};
pub use config::GameConfig;
pub use dataset::{Dataset, DatasetScripts, QueryOutput, TableSummary};
pub use error::{GameError, Result};
pub use game::{GameEngine, GameOptions, Submission};
pub use matcher::{evaluate, Evaluation, StageObjective, StateDelta};
pub use puzzle::Puzzle;
pub use query_gate::{check_query, is_query_allowed, QueryRejection};
pub use row::{Row, SqlValue};
pub use session::{SessionState, VerificationOutcome};
pub use stage::Stage;
