// binchart CLI - headless chart rendering
// Reads a CSV dataset and a chart config, prints the view model as JSON.

mod dataset;
mod exit_codes;
mod logger;
mod replay;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use binchart_config::ChartConfig;
use binchart_engine::{ChartSession, UpdateOrigin};
use clap::{Parser, Subcommand};
use serde::Serialize;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bchart")]
#[command(about = "Bin, aggregate and isolate tabular data into a chart view model")]
#[command(version)]
struct Cli {
    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Inputs {
    /// CSV dataset (first line is the header)
    #[arg(long, short = 'd')]
    data: PathBuf,

    /// Chart configuration (.toml, or .json)
    #[arg(long, short = 'c', env = "BCHART_CONFIG")]
    config: PathBuf,

    /// CSV delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one chart and print its view model
    #[command(after_help = "\
Examples:
  bchart render --data people.csv --config chart.toml
  bchart render -d people.csv -c chart.toml --select 0 --select 3 --multi --pretty")]
    Render {
        #[command(flatten)]
        inputs: Inputs,

        /// Isolate these leaves (indices from a previous render)
        #[arg(long, value_name = "LEAF_INDEX")]
        select: Vec<usize>,

        /// Accumulate selections instead of replacing
        #[arg(long)]
        multi: bool,
    },

    /// Apply a JSON script of actions and print the final view model
    #[command(after_help = "\
Script actions: configure, toggle, clear, undo. See the replay module docs.

Examples:
  bchart replay --data people.csv --config chart.toml --script actions.json")]
    Replay {
        #[command(flatten)]
        inputs: Inputs,

        /// JSON array of actions
        #[arg(long, short = 's')]
        script: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match cli.command {
        Commands::Render { inputs, select, multi } => cmd_render(inputs, select, multi),
        Commands::Replay { inputs, script } => cmd_replay(inputs, script),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// shared
// ============================================================================

fn load_config(path: &Path) -> Result<ChartConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        ChartConfig::from_json(&content)
    } else {
        ChartConfig::from_toml(&content)
    };
    parsed.map_err(|e| {
        CliError::args(format!("{}: {e}", path.display()))
            .with_hint("column fields take 0-based ordinals, -1 means none")
    })
}

fn delimiter_byte(delimiter: char) -> Result<u8, CliError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CliError::args(format!("delimiter must be a single ASCII character, got {delimiter:?}")))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| CliError::io(e.to_string()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
    Ok(())
}

// ============================================================================
// render
// ============================================================================

fn cmd_render(inputs: Inputs, select: Vec<usize>, multi: bool) -> Result<(), CliError> {
    let delimiter = delimiter_byte(inputs.delimiter)?;
    let config = load_config(&inputs.config)?;
    let data = dataset::load_csv(&inputs.data, delimiter)?;

    let mut session = ChartSession::new(config);
    let mut view = session.update(data, UpdateOrigin::User);

    if !select.is_empty() {
        for leaf in &select {
            if !session.select_leaf(*leaf, multi) {
                return Err(CliError::args(format!(
                    "--select {leaf}: the chart has {} leaves",
                    view.leaf_count()
                )));
            }
        }
        view = session.render();
    }

    print_json(&view, inputs.pretty)
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(inputs: Inputs, script: PathBuf) -> Result<(), CliError> {
    let delimiter = delimiter_byte(inputs.delimiter)?;
    let config = load_config(&inputs.config)?;
    let actions = replay::load_script(&script)?;
    let data = dataset::load_csv(&inputs.data, delimiter)?;

    let mut session = ChartSession::new(config);
    let result = replay::run(&mut session, data, &actions)?;
    print_json(&result, inputs.pretty)
}
