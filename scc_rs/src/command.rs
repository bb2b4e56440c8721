//! Command dispatcher.
//!
//! Loosely-typed [`CommandArgs`] (what a transport hands us) are turned into a
//! typed [`Command`], executed against the metrics adapter, and shaped into a
//! JSON [`Response`]. Every outcome, including internal faults, ends up as a
//! well-formed payload; nothing escapes [`Dispatcher::dispatch`].

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SccConfig;
use crate::diff::ProjectComparison;
use crate::error::{MetricsError, MetricsResult};
use crate::hotspots::complexity_hotspots;
use crate::runner::{MetricsRunner, RunOutput};

/// Every command name, sorted.
pub const COMMAND_NAMES: [&str; 4] = ["analyze", "compare", "file", "hotspots"];

/// Arguments accepted by the `scc` tool. Which keys are required depends on
/// `command`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommandArgs {
    /// Operation to run: 'analyze', 'hotspots', 'file' or 'compare'
    pub command: String,
    /// Directory to analyze (analyze, hotspots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// First project to compare (compare)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_a: Option<String>,
    /// Second project to compare (compare)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_b: Option<String>,
    /// Single file to measure (file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Minimum complexity for hotspots, inclusive (default: 20)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze { path: String },
    Hotspots { path: String, threshold: u64 },
    File { file_path: String },
    Compare { path_a: String, path_b: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command")]
    Unknown { command: String },
    #[error("missing required argument '{arg}'")]
    MissingArgument { command: String, arg: &'static str },
}

impl CommandError {
    pub fn to_payload(&self) -> Value {
        match self {
            CommandError::Unknown { command } => json!({
                "error": self.to_string(),
                "command": command,
                "available": COMMAND_NAMES,
            }),
            CommandError::MissingArgument { command, .. } => json!({
                "error": self.to_string(),
                "command": command,
            }),
        }
    }
}

fn required(
    command: &str,
    arg: &'static str,
    value: Option<String>,
) -> Result<String, CommandError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CommandError::MissingArgument {
            command: command.to_string(),
            arg,
        })
}

/// Complexities are integers, so `>= 2.5` is the same filter as `>= 3`.
fn effective_threshold(raw: Option<f64>, default: u64) -> u64 {
    match raw {
        Some(t) if t.is_nan() => default,
        Some(t) if t <= 0.0 => 0,
        Some(t) => t.ceil() as u64,
        None => default,
    }
}

impl Command {
    pub fn from_args(args: CommandArgs, default_threshold: u64) -> Result<Self, CommandError> {
        let name = args.command.trim();
        match name {
            "analyze" => Ok(Command::Analyze {
                path: required(name, "path", args.path)?,
            }),
            "hotspots" => Ok(Command::Hotspots {
                path: required(name, "path", args.path)?,
                threshold: effective_threshold(args.threshold, default_threshold),
            }),
            "file" => Ok(Command::File {
                file_path: required(name, "file_path", args.file_path)?,
            }),
            "compare" => Ok(Command::Compare {
                path_a: required(name, "path_a", args.path_a)?,
                path_b: required(name, "path_b", args.path_b)?,
            }),
            _ => Err(CommandError::Unknown {
                command: args.command.clone(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Analyze { .. } => "analyze",
            Command::Hotspots { .. } => "hotspots",
            Command::File { .. } => "file",
            Command::Compare { .. } => "compare",
        }
    }
}

/// Result envelope handed back to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Set whenever the payload carries an `error` key
    pub is_error: bool,
    pub payload: Value,
}

impl Response {
    pub fn from_payload(payload: Value) -> Self {
        let is_error = payload.get("error").is_some();
        Self { is_error, payload }
    }

    /// Payload rendered as the text of a content block.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.payload)
            .unwrap_or_else(|e| format!("Serialization error: {}", e))
    }
}

fn internal_failure(command: &str, details: &str) -> Value {
    error!("Failed to handle command '{}': {}", command, details);
    json!({
        "error": "failed to handle command",
        "command": command,
        "details": details,
    })
}

/// Regular failures become an `{error}` payload; faults bubble up to the
/// dispatcher.
fn error_payload(err: MetricsError) -> MetricsResult<Value> {
    if err.is_fault() {
        Err(err)
    } else {
        Ok(json!({ "error": err.to_string() }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    runner: Arc<MetricsRunner>,
}

impl Dispatcher {
    pub fn new(config: SccConfig) -> Self {
        Self {
            runner: Arc::new(MetricsRunner::new(config)),
        }
    }

    pub fn runner(&self) -> &MetricsRunner {
        &self.runner
    }

    /// Parse and run one command.
    pub async fn dispatch(&self, args: CommandArgs) -> Response {
        match Command::from_args(args, self.runner.config().default_threshold) {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                warn!("Rejected command: {}", e);
                Response::from_payload(e.to_payload())
            }
        }
    }

    /// Like [`Dispatcher::dispatch`], for hosts that hand over raw JSON.
    pub async fn dispatch_value(&self, request: Value) -> Response {
        match serde_json::from_value::<CommandArgs>(request) {
            Ok(args) => self.dispatch(args).await,
            Err(e) => Response::from_payload(json!({
                "error": "invalid arguments",
                "details": e.to_string(),
            })),
        }
    }

    /// Run a typed command. Handler faults and panics are caught here and
    /// reported as a generic failure.
    pub async fn execute(&self, command: Command) -> Response {
        let name = command.name();
        info!("Handling command '{}'", name);

        let runner = Arc::clone(&self.runner);
        run_guarded(name, async move { handle(&runner, command).await }).await
    }
}

/// Run a handler future on its own task. A fault or a panic inside it becomes
/// `{error: "failed to handle command", command, details}`.
pub async fn run_guarded<F>(command: &str, handler: F) -> Response
where
    F: Future<Output = MetricsResult<Value>> + Send + 'static,
{
    let payload = match tokio::spawn(handler).await {
        Ok(Ok(payload)) => payload,
        Ok(Err(fault)) => internal_failure(command, &fault.to_string()),
        Err(join_error) => internal_failure(command, &join_error.to_string()),
    };
    Response::from_payload(payload)
}

async fn handle(runner: &MetricsRunner, command: Command) -> MetricsResult<Value> {
    match command {
        Command::Analyze { path } => match runner.analyze_project(&path).await {
            Ok(RunOutput { analysis, .. }) => Ok(json!({
                "summary": analysis.summary,
                "by_language": analysis.by_language,
                "file_count": analysis.summary.file_count,
                "path": path,
            })),
            Err(e) => error_payload(e),
        },
        Command::Hotspots { path, threshold } => match runner.analyze_project(&path).await {
            Ok(RunOutput { groups, .. }) => {
                let hotspots = complexity_hotspots(&groups, threshold);
                Ok(json!({
                    "count": hotspots.len(),
                    "hotspots": hotspots,
                    "threshold": threshold,
                    "path": path,
                }))
            }
            Err(e) => error_payload(e),
        },
        Command::File { file_path } => match runner.file_metrics(&file_path).await {
            Ok(record) => Ok(json!(record)),
            Err(e) => error_payload(e),
        },
        Command::Compare { path_a, path_b } => {
            let summary_a = match runner.analyze_project(&path_a).await {
                Ok(run) => run.analysis.summary,
                Err(e) => return side_failure("path_a", &path_a, e),
            };
            let summary_b = match runner.analyze_project(&path_b).await {
                Ok(run) => run.analysis.summary,
                Err(e) => return side_failure("path_b", &path_b, e),
            };
            Ok(json!(ProjectComparison::new(
                path_a, summary_a, path_b, summary_b
            )))
        }
    }
}

fn side_failure(side: &str, path: &str, err: MetricsError) -> MetricsResult<Value> {
    if err.is_fault() {
        return Err(err);
    }
    Ok(json!({
        "error": format!("analysis of {} ({}) failed: {}", side, path, err),
    }))
}
