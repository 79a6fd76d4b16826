use tictictomb::clock::Urgency;
use tictictomb::narrative::{self, Character, MISSION_INTRO, VILLAIN};
use tictictomb::{
    check_query, format_clock, Dataset, DatasetScripts, GameConfig, GameEngine, QueryOutput,
    Stage, Submission, VerificationOutcome,
};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tictictomb")]
#[command(about = "SQL bomb-defusal puzzle: find the bomb, defuse it, catch the culprit")]
#[command(version)]
struct Args {
    /// SQLite database file (or set TICTICTOMB_DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Directory with schema.sql and sample_data.sql (or set TICTICTOMB_ASSETS_DIR)
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// Mission length in seconds (or set TICTICTOMB_TIME_LIMIT_SECS)
    #[arg(long, global = true)]
    time_limit: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed the puzzle database
    Init {
        /// Rebuild the database even if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Play the game interactively
    Play {
        /// Advance as soon as a finding is made, without the verification question
        #[arg(long)]
        no_verify: bool,
    },
    /// Run a single query through the gate and print its rows
    Query {
        sql: String,

        /// Also evaluate the rows against this stage's objective
        #[arg(long)]
        stage: Option<u8>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check a query against the gate without running it
    Check { sql: String },
    /// List the tables and their columns
    Schema,
    /// Show the briefing for a stage
    Brief {
        #[arg(long, default_value_t = 1)]
        stage: u8,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = GameConfig::from_env()?;
    if let Some(path) = args.db_path {
        config.db_path = path;
    }
    if let Some(dir) = args.assets_dir {
        config.assets_dir = dir;
    }
    if let Some(secs) = args.time_limit {
        if secs == 0 {
            anyhow::bail!("--time-limit must be greater than zero");
        }
        config.time_limit_secs = secs;
    }

    match args.command {
        Commands::Init { force } => init(&config, force),
        Commands::Play { no_verify } => {
            if no_verify {
                config.require_verification = false;
            }
            play(&config)
        }
        Commands::Query { sql, stage, json } => run_query(&config, &sql, stage, json),
        Commands::Check { sql } => check(&sql),
        Commands::Schema => schema(&config),
        Commands::Brief { stage } => show_brief(stage),
    }
}

fn init(config: &GameConfig, force: bool) -> Result<()> {
    let scripts = DatasetScripts::load(&config.assets_dir)?;
    let dataset = Dataset::bootstrap(&config.db_path, &scripts, force)?;
    println!("✅ Database ready at {}", dataset.path().display());
    Ok(())
}

/// Open the database, building it first when it does not exist yet
fn open_dataset(config: &GameConfig) -> Result<Dataset> {
    if config.db_path.is_file() {
        return Ok(Dataset::open(&config.db_path)?);
    }
    info!("No database at {}, initializing", config.db_path.display());
    let scripts = DatasetScripts::load(&config.assets_dir)?;
    Ok(Dataset::bootstrap(&config.db_path, &scripts, false)?)
}

fn check(sql: &str) -> Result<()> {
    match check_query(sql) {
        Ok(()) => {
            println!("✅ Query allowed");
            Ok(())
        }
        Err(rejection) => {
            println!("❌ Query rejected: {}", rejection);
            std::process::exit(1);
        }
    }
}

fn run_query(config: &GameConfig, sql: &str, stage: Option<u8>, json: bool) -> Result<()> {
    if let Err(rejection) = check_query(sql) {
        if json {
            println!("{}", serde_json::json!({ "rejected": rejection }));
        } else {
            println!("❌ Query rejected: {}", rejection);
        }
        std::process::exit(1);
    }

    let dataset = open_dataset(config)?;
    let output = dataset.run_query(sql)?;
    let evaluation = stage.map(|n| tictictomb::evaluate(n, &output.rows));

    if json {
        let mut value = output.to_json();
        if let Some(evaluation) = &evaluation {
            value["evaluation"] = serde_json::to_value(evaluation)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", render_table(&output, config.max_rows));
    if let (Some(n), Some(evaluation)) = (stage, evaluation) {
        if evaluation.satisfied {
            println!("🎯 Stage {} objective satisfied", n);
        } else {
            println!("Stage {} objective not satisfied", n);
        }
    }
    Ok(())
}

fn schema(config: &GameConfig) -> Result<()> {
    let dataset = open_dataset(config)?;
    print_schema(&dataset)
}

fn print_schema(dataset: &Dataset) -> Result<()> {
    for table in dataset.table_summaries()? {
        println!("  {} ({})", table.name, table.columns.iter().join(", "));
    }
    Ok(())
}

fn show_brief(stage: u8) -> Result<()> {
    let stage = Stage::from_number(stage)
        .ok_or_else(|| anyhow::anyhow!("stage must be 1, 2 or 3"))?;
    print_brief(stage);
    if let Some(brief) = narrative::brief(stage) {
        println!("💡 {}\n", brief.hint);
    }
    Ok(())
}

fn print_brief(stage: Stage) {
    let Some(brief) = narrative::brief(stage) else {
        return;
    };
    println!("\n{}", "=".repeat(80));
    println!(" {}: {}", stage, brief.title);
    println!("{}", "=".repeat(80));
    println!("{}\n", brief.description);
    println!("{}\n", brief.story);
    print_character(brief.character);
    println!("🎯 Target profile");
    print_character(&VILLAIN);
    println!("📚 {}:", brief.sample_caption);
    println!("{}\n", brief.sample_query);
}

fn print_character(character: &Character) {
    println!("👤 {} ({})", character.name, character.role);
    println!("   {}\n", character.description);
}

/// Render rows as a plain text table, showing at most `max_rows` rows
fn render_table(output: &QueryOutput, max_rows: usize) -> String {
    if output.columns.is_empty() {
        return "(no columns)".to_string();
    }

    let shown: Vec<Vec<String>> = output
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.values().map(|value| value.to_string()).collect())
        .collect();

    let widths: Vec<usize> = output
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            shown
                .iter()
                .filter_map(|cells| cells.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(shown.len() + 3);
    lines.push(table_line(output.columns.iter().map(String::as_str), &widths));
    lines.push(widths.iter().map(|width| "-".repeat(*width)).join("-+-"));
    for cells in &shown {
        lines.push(table_line(cells.iter().map(String::as_str), &widths));
    }

    let total = output.row_count();
    if total > shown.len() {
        lines.push(format!("... {} more rows", total - shown.len()));
    }
    lines.push(format!("({} rows, {}ms)", total, output.execution_time_ms));
    lines.join("\n")
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .join(" | ")
}

fn clock_label(game: &GameEngine) -> String {
    let countdown = game.countdown();
    let now = Utc::now();
    let icon = match countdown.urgency(now) {
        Urgency::Normal => "⏱️",
        Urgency::Warning => "⚠️",
        Urgency::Danger => "🔥",
    };
    format!("{} {}", icon, format_clock(countdown.remaining_secs(now)))
}

const HELP: &str = "\
Enter a SELECT query; end it with ';' or a blank line.
Commands:
  :hint     show the intelligence hint for this stage
  :story    repeat the briefing
  :sample   show the sample query
  :schema   list tables and columns
  :clues    list the findings so far
  :status   show stage and time left
  :restart  start the mission over
  :quit     leave the game";

enum Flow {
    Continue,
    Quit,
}

/// What a line of REPL input amounts to
#[derive(Debug, PartialEq, Eq)]
enum Input {
    /// A `:command` typed at the start of a query
    Meta(String),
    /// More lines are needed before the query is complete
    Pending,
    Query(String),
}

/// Collects query lines until one ends with `;` or a blank line follows text
#[derive(Debug, Default)]
struct QueryBuffer {
    text: String,
}

impl QueryBuffer {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn feed(&mut self, line: &str) -> Input {
        let trimmed = line.trim();

        if self.text.is_empty() && trimmed.starts_with(':') {
            return Input::Meta(trimmed.to_string());
        }

        if !trimmed.is_empty() {
            self.text.push_str(line.trim_end_matches(['\r', '\n']));
            self.text.push('\n');
        }

        let complete = trimmed.ends_with(';') || (trimmed.is_empty() && !self.text.is_empty());
        if complete {
            Input::Query(std::mem::take(&mut self.text))
        } else {
            Input::Pending
        }
    }
}

fn meta_command(game: &mut GameEngine, command: &str) -> Result<Flow> {
    match command {
        ":quit" | ":q" | ":exit" => return Ok(Flow::Quit),
        ":help" => println!("{}", HELP),
        ":hint" => {
            if let Some(brief) = game.brief() {
                println!("💡 {}", brief.hint);
            }
        }
        ":story" => print_brief(game.session().stage),
        ":sample" => {
            if let Some(brief) = game.brief() {
                println!("📚 {}:\n{}", brief.sample_caption, brief.sample_query);
            }
        }
        ":schema" => print_schema(game.dataset())?,
        ":clues" => {
            if game.session().clues.is_empty() {
                println!("No clues yet.");
            }
            for clue in &game.session().clues {
                println!("🔎 {}", clue);
            }
        }
        ":status" => {
            println!("{} | {}", game.session().stage, clock_label(game));
            if let Some(query) = game.last_query() {
                println!("Last query: {}", query.trim());
            }
            if let Some(err) = game.last_error() {
                println!("Last error: {}", err);
            }
        }
        ":restart" => {
            game.restart();
            println!("🔄 Mission restarted.");
            print_brief(game.session().stage);
        }
        other => println!("Unknown command '{}'. Type :help for the list.", other),
    }
    Ok(Flow::Continue)
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    io::stdout().flush()?;
    Ok(())
}

fn play(config: &GameConfig) -> Result<()> {
    let dataset = open_dataset(config)?;
    let mut game = GameEngine::new(dataset, config.game_options());
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("💣 TICTICTOMB\n\n{}\n", MISSION_INTRO);
    println!("{}", HELP);
    print_brief(game.session().stage);

    let mut buffer = QueryBuffer::default();
    loop {
        if game.is_completed() {
            let elapsed = game.countdown().elapsed_secs(Utc::now());
            println!("\n🎉 {}", narrative::debriefing(&format_clock(elapsed)));
            return Ok(());
        }

        if game.countdown().is_expired(Utc::now()) {
            println!("\n💥 Time's up! The bomb has detonated.");
            game.restart();
            buffer.clear();
            print_brief(game.session().stage);
            continue;
        }

        if let Some(question) = game.verification_question() {
            prompt(&format!("\n❓ {}\n> ", question))?;
            let Some(answer) = read_line(&mut input)? else {
                return Ok(());
            };
            match game.verify(&answer)? {
                VerificationOutcome::Advanced(stage) => {
                    println!("✅ Correct!");
                    print_brief(stage);
                }
                VerificationOutcome::Incorrect => println!("❌ That's not right. Try again."),
                VerificationOutcome::TimeUp => {
                    println!("\n💥 Time's up! The bomb has detonated.");
                    print_brief(game.session().stage);
                }
            }
            continue;
        }

        let label = if buffer.is_empty() {
            format!("[{}] sql> ", clock_label(&game))
        } else {
            "   ...> ".to_string()
        };
        prompt(&label)?;
        let Some(line) = read_line(&mut input)? else {
            return Ok(());
        };
        let sql = match buffer.feed(&line) {
            Input::Pending => continue,
            Input::Meta(command) => match meta_command(&mut game, &command)? {
                Flow::Continue => continue,
                Flow::Quit => return Ok(()),
            },
            Input::Query(sql) => sql,
        };

        match game.submit(&sql) {
            Ok(Submission::Rejected(rejection)) => println!("🚫 Query rejected: {}", rejection),
            Ok(Submission::Failed(message)) => println!("❌ {}", message),
            Ok(Submission::TimeUp) => {
                println!("\n💥 Time's up! The bomb has detonated.");
                print_brief(game.session().stage);
            }
            Ok(Submission::Executed {
                output,
                evaluation,
                advanced_to,
            }) => {
                println!("{}", render_table(&output, config.max_rows));
                if evaluation.satisfied {
                    if let Some(clue) = &evaluation.delta.clue {
                        println!("🎯 {}", clue);
                    }
                }
                if let Some(stage) = advanced_to {
                    print_brief(stage);
                }
            }
            Err(err) => error!("{}", err),
        }
    }
}
