//! Game Engine
//!
//! Drives one player session: gate the submitted text, run it against the
//! dataset, evaluate the rows, record the findings and, once the player
//! confirms them, advance the stage.

use crate::clock::{Countdown, DEFAULT_TIME_LIMIT_SECS};
use crate::dataset::{Dataset, QueryOutput};
use crate::error::{GameError, Result};
use crate::matcher::Evaluation;
use crate::narrative::{self, StageBrief};
use crate::puzzle::Puzzle;
use crate::query_gate::{check_query, QueryRejection};
use crate::session::{SessionState, VerificationOutcome};
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    pub time_limit_secs: u64,
    pub require_verification: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            require_verification: true,
        }
    }
}

/// What became of a submitted query
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Turned away by the query gate; nothing ran
    Rejected(QueryRejection),
    /// The dataset refused the query; the session is unchanged
    Failed(String),
    Executed {
        output: QueryOutput,
        evaluation: Evaluation,
        /// Set when the stage advanced without a verification step
        advanced_to: Option<Stage>,
    },
    /// The clock ran out before the query was looked at; the session was reset
    TimeUp,
}

pub struct GameEngine {
    dataset: Dataset,
    puzzle: Puzzle,
    options: GameOptions,
    session: SessionState,
    last_query: Option<String>,
    last_error: Option<String>,
}

impl GameEngine {
    pub fn new(dataset: Dataset, options: GameOptions) -> Self {
        Self::with_session(dataset, options, SessionState::new())
    }

    pub fn with_session(dataset: Dataset, options: GameOptions, session: SessionState) -> Self {
        info!("Starting session {}", session.id);
        Self {
            dataset,
            puzzle: Puzzle::standard(),
            options,
            session,
            last_query: None,
            last_error: None,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::new(self.session.started_at, self.options.time_limit_secs)
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Briefing for the current stage; `None` once the mission is complete
    pub fn brief(&self) -> Option<&'static StageBrief> {
        narrative::brief(self.session.stage)
    }

    pub fn is_completed(&self) -> bool {
        self.session.is_completed()
    }

    pub fn awaiting_verification(&self) -> bool {
        self.session.pending_verification.is_some()
    }

    /// Question the player must answer to confirm the pending finding
    pub fn verification_question(&self) -> Option<&'static str> {
        self.session
            .pending_verification
            .and_then(narrative::brief)
            .map(|brief| brief.verification_question)
    }

    pub fn submit(&mut self, text: &str) -> Result<Submission> {
        self.submit_at(text, Utc::now())
    }

    /// Submit a query as of `now`
    pub fn submit_at(&mut self, text: &str, now: DateTime<Utc>) -> Result<Submission> {
        if self.is_completed() {
            return Err(GameError::Session("mission already completed".to_string()));
        }
        if self.expire_if_due(now) {
            return Ok(Submission::TimeUp);
        }
        if self.awaiting_verification() {
            return Err(GameError::Session(
                "verify your finding before running another query".to_string(),
            ));
        }

        self.last_query = Some(text.to_string());
        self.last_error = None;

        if let Err(rejection) = check_query(text) {
            warn!("Rejected query: {}", rejection);
            return Ok(Submission::Rejected(rejection));
        }

        let output = match self.dataset.run_query(text) {
            Ok(output) => output,
            Err(err) => {
                warn!("Query failed: {}", err);
                let message = err.to_string();
                self.last_error = Some(message.clone());
                return Ok(Submission::Failed(message));
            }
        };

        let stage = self.session.stage;
        let evaluation = stage
            .number()
            .map(|n| self.puzzle.evaluate(n, &output.rows))
            .unwrap_or_default();
        debug!(
            "{} evaluation over {} rows: satisfied={}",
            stage,
            output.row_count(),
            evaluation.satisfied
        );

        let mut advanced_to = None;
        if evaluation.satisfied {
            self.session.apply(&evaluation.delta);
            info!("🎯 {} objective satisfied", stage);
            if self.options.require_verification {
                self.session.begin_verification()?;
            } else {
                advanced_to = Some(self.session.advance()?);
            }
        }

        Ok(Submission::Executed {
            output,
            evaluation,
            advanced_to,
        })
    }

    /// Answer the pending verification question
    pub fn verify(&mut self, answer: &str) -> Result<VerificationOutcome> {
        self.verify_at(answer, Utc::now())
    }

    /// Answer the pending verification question as of `now`. An answer that
    /// arrives after the clock ran out resets the session instead.
    pub fn verify_at(&mut self, answer: &str, now: DateTime<Utc>) -> Result<VerificationOutcome> {
        if !self.is_completed() && self.expire_if_due(now) {
            return Ok(VerificationOutcome::TimeUp);
        }
        let outcome = self.session.verify(&self.puzzle, answer)?;
        match outcome {
            VerificationOutcome::Advanced(stage) => info!("✅ Finding verified, now at {}", stage),
            VerificationOutcome::Incorrect => warn!("Incorrect verification answer"),
            VerificationOutcome::TimeUp => {}
        }
        Ok(outcome)
    }

    /// Reset the session when the clock has run out. The clock stops once
    /// the mission is completed.
    fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_completed() || !self.countdown().is_expired(now) {
            return false;
        }
        warn!("Session {} ran out of time", self.session.id);
        self.restart_at(now);
        true
    }

    /// Throw the session away and start over at stage 1
    pub fn restart(&mut self) {
        self.restart_at(Utc::now());
    }

    fn restart_at(&mut self, now: DateTime<Utc>) {
        self.session = SessionState::started_at(now);
        self.last_query = None;
        self.last_error = None;
        info!("Session restarted as {}", self.session.id);
    }
}
