//! Action replay: drive a chart session from a JSON script.
//!
//! Usage: bchart replay --data people.csv --config chart.toml --script actions.json
//!
//! The script is a JSON array of actions, applied in order:
//!
//! ```json
//! [
//!   {"action": "configure", "patch": {"bin_column": 1, "number_of_bins": 3}},
//!   {"action": "toggle", "leaf": 0},
//!   {"action": "toggle", "leaf": 2, "multi": true},
//!   {"action": "clear"},
//!   {"action": "undo"}
//! ]
//! ```
//!
//! The session re-renders after every action, so `toggle` indices always
//! refer to the leaves of the view produced by the previous action.

use std::path::Path;

use binchart_config::ConfigPatch;
use binchart_engine::{ChartSession, Dataset, UndoOutcome, UpdateOrigin, ViewModel};
use serde::{Deserialize, Serialize};

use crate::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Configure { patch: ConfigPatch },
    Toggle {
        leaf: usize,
        #[serde(default)]
        multi: bool,
    },
    Clear,
    Undo,
}

/// What one action did, reported alongside the final view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    pub applied: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayResult {
    pub steps: Vec<StepReport>,
    pub can_undo: bool,
    pub view: ViewModel,
}

pub fn load_script(path: &Path) -> Result<Vec<Action>, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    parse_script(&content)
}

pub fn parse_script(content: &str) -> Result<Vec<Action>, CliError> {
    serde_json::from_str(content).map_err(|e| CliError::parse(format!("replay script: {e}")))
}

/// Run `actions` against a fresh render of `dataset`.
///
/// A toggle naming a leaf that does not exist is an error: the script was
/// written against a different view.
pub fn run(
    session: &mut ChartSession,
    dataset: Dataset,
    actions: &[Action],
) -> Result<ReplayResult, CliError> {
    let mut view = session.update(dataset, UpdateOrigin::User);
    let mut steps = Vec::with_capacity(actions.len());

    for (i, action) in actions.iter().enumerate() {
        let step = i + 1;
        let (name, applied) = match action {
            Action::Configure { patch } => ("configure", session.apply_configuration(patch)),
            Action::Toggle { leaf, multi } => {
                if !session.select_leaf(*leaf, *multi) {
                    return Err(CliError::parse(format!(
                        "step {step}: leaf {leaf} does not exist ({} leaves)",
                        view.leaf_count()
                    )));
                }
                ("toggle", true)
            }
            Action::Clear => ("clear", session.clear_selection()),
            Action::Undo => {
                let outcome = session.undo();
                if outcome == UndoOutcome::Underflow {
                    tracing::info!("step {step}: nothing to undo");
                }
                ("undo", outcome.applied())
            }
        };
        tracing::debug!("step {step}: {name} (applied: {applied})");
        steps.push(StepReport {
            step,
            action: name,
            applied,
        });
        view = session.render();
    }

    Ok(ReplayResult {
        steps,
        can_undo: session.can_undo(),
        view,
    })
}
