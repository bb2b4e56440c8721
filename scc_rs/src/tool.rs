//! Tool metadata for hosts that mount the dispatcher.

use serde_json::{Value, json};

use crate::command::CommandArgs;

pub const TOOL_NAME: &str = "scc";

pub const TOOL_DESCRIPTION: &str = "Code metrics from scc. Commands: \
    'analyze' (path) - totals, per-language table and file count; \
    'hotspots' (path, threshold=20) - files with complexity >= threshold, most complex first; \
    'file' (file_path) - metrics for a single file; \
    'compare' (path_a, path_b) - both summaries plus B minus A differences.";

/// JSON schema of the tool's arguments.
pub fn input_schema() -> Value {
    schemars::schema_for!(CommandArgs).to_value()
}

/// `{name, description, input_schema}` as advertised to clients.
pub fn tool_metadata() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": TOOL_DESCRIPTION,
        "input_schema": input_schema(),
    })
}
