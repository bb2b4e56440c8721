//! # scc-mcp
//!
//! MCP server exposing scc code metrics as one structured tool.
//! Ask for summaries, complexity hotspots, single-file metrics or a diff
//! between two projects instead of parsing scc tables by hand.
//!
//! ## Architecture
//!
//! - **One tool**: `scc`, with a `command` argument selecting the operation
//! - **Stateless**: every call runs scc fresh, nothing is cached
//! - **Errors are payloads**: failures come back as `{error, ...}` with the
//!   MCP error flag set, never as a dropped connection
//!
//! ## Usage
//!
//! ```bash
//! # Serve MCP over stdio
//! scc-mcp
//!
//! # One-shot, without an MCP host
//! scc-mcp call '{"command":"hotspots","path":".","threshold":10}'
//!
//! # Tool metadata for host registration
//! scc-mcp schema
//! ```

use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tracing::{debug, info};

use scc_metrics::tool::tool_metadata;
use scc_metrics::{CommandArgs, Dispatcher, Response, SccConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "scc-mcp")]
#[command(about = "MCP server for scc - code metrics, hotspots and project diffs")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// scc executable to run (overrides config)
    #[arg(long, global = true)]
    scc_bin: Option<String>,

    /// Kill scc after this many seconds (overrides config, 0 disables)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Config file (default: .scc-mcp/config.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve MCP over stdio (default)
    Serve,
    /// Run a single command and print the response envelope
    Call {
        /// Tool arguments as JSON, e.g. '{"command":"analyze","path":"."}'
        request: String,
    },
    /// Print tool name, description and input schema
    Schema,
}

impl Args {
    /// Config file values with CLI overrides applied.
    fn resolve_config(&self) -> Result<SccConfig> {
        let mut config = match &self.config {
            Some(path) => SccConfig::load_from_path(path),
            None => {
                let cwd = std::env::current_dir().context("Cannot read working directory")?;
                SccConfig::load(&cwd)
            }
        };
        if let Some(bin) = &self.scc_bin {
            config.binary = bin.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

// ============================================================================
// Server
// ============================================================================

/// MCP front-end for the command dispatcher.
#[derive(Clone)]
struct SccServer {
    dispatcher: Dispatcher,
    /// Tool router (generated by macro)
    tool_router: ToolRouter<Self>,
}

impl SccServer {
    fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }
}

/// Wrap a dispatcher response as one text block, flagged when it is an error.
fn into_call_result(response: Response) -> CallToolResult {
    let content = vec![Content::text(response.to_text())];
    if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool_router]
impl SccServer {
    // Must stay identical to `scc_metrics::tool::TOOL_DESCRIPTION`.
    #[tool(
        name = "scc",
        description = "Code metrics from scc. Commands: 'analyze' (path) - totals, per-language table and file count; 'hotspots' (path, threshold=20) - files with complexity >= threshold, most complex first; 'file' (file_path) - metrics for a single file; 'compare' (path_a, path_b) - both summaries plus B minus A differences."
    )]
    async fn scc(
        &self,
        Parameters(params): Parameters<CommandArgs>,
    ) -> Result<CallToolResult, McpError> {
        debug!("scc tool called: {:?}", params);
        let response = self.dispatcher.dispatch(params).await;
        Ok(into_call_result(response))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SccServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation {
                name: "scc-mcp".to_string(),
                title: Some("scc Metrics MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Code metrics backed by scc. One tool, 'scc', selected by its 'command' argument:\n\
                 - analyze(path) - Totals, per-language table, file count.\n\
                 - hotspots(path, threshold) - Files with complexity >= threshold (default 20).\n\
                 - file(file_path) - Metrics for one file.\n\
                 - compare(path_a, path_b) - Both summaries plus B minus A diff.\n\n\
                 Failures return {\"error\": ...} with the error flag set."
                    .into(),
            ),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Install custom panic hook that logs to stderr.
/// A "broken pipe" panic from rmcp means the client disconnected, so we exit.
/// Any other panic unwinds normally; the dispatcher turns a panicking handler
/// task into a failure payload and keeps serving.
fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        if is_broken_pipe(&msg) {
            eprintln!("[scc-mcp] Client disconnected (broken pipe), shutting down");
            // Exit with code 1 (not 101 which indicates panic)
            std::process::exit(1);
        }

        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        eprintln!("[scc-mcp] Panic{}: {}", location, msg);
    }));
}

fn is_broken_pipe(msg: &str) -> bool {
    msg.contains("Broken pipe") || msg.contains("os error 32")
}

/// Configure SIGPIPE handling to ignore broken pipes at OS level.
/// Writing to a closed pipe then fails with EPIPE instead of killing us.
#[cfg(unix)]
fn ignore_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
fn ignore_sigpipe() {}

fn init_logging(level: &str) {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.parse().unwrap_or_default()),
        )
        .init();
}

async fn serve(dispatcher: Dispatcher) -> Result<ExitCode> {
    info!("Starting scc-mcp v{}", env!("CARGO_PKG_VERSION"));

    let server = SccServer::new(dispatcher);

    info!("Server ready. Listening on stdio...");

    server
        .serve(rmcp::transport::stdio())
        .await?
        .waiting()
        .await?;

    Ok(ExitCode::SUCCESS)
}

async fn call_once(dispatcher: Dispatcher, request: &str) -> Result<ExitCode> {
    let request: serde_json::Value =
        serde_json::from_str(request).context("Request is not valid JSON")?;
    let response = dispatcher.dispatch_value(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(if response.is_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = args.resolve_config()?;
    debug!("Resolved config: {:?}", config);

    match args.mode {
        None | Some(Mode::Serve) => serve(Dispatcher::new(config)).await,
        Some(Mode::Call { ref request }) => call_once(Dispatcher::new(config), request).await,
        Some(Mode::Schema) => {
            println!("{}", serde_json::to_string_pretty(&tool_metadata())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ignore SIGPIPE - allows broken pipe to be handled as error instead of signal
    ignore_sigpipe();

    // Install panic hook for clean shutdown on broken pipe
    install_panic_hook();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            let err_str = format!("{:?}", e);
            if is_broken_pipe(&err_str) {
                eprintln!("[scc-mcp] Client disconnected, shutting down");
                ExitCode::SUCCESS
            } else {
                eprintln!("[scc-mcp] Error: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scc_metrics::command::run_guarded;
    use scc_metrics::tool::{TOOL_DESCRIPTION, TOOL_NAME};
    use serde_json::json;

    #[test]
    fn error_responses_set_the_mcp_error_flag() {
        let result = into_call_result(Response::from_payload(json!({"error": "boom"})));
        assert_eq!(result.is_error, Some(true));

        let result = into_call_result(Response::from_payload(json!({"count": 0})));
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn cli_overrides_config() {
        let args = Args::parse_from([
            "scc-mcp",
            "--scc-bin",
            "/opt/scc",
            "--timeout-secs",
            "9",
            "--config",
            "/nonexistent/config.toml",
            "schema",
        ]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.binary, "/opt/scc");
        assert_eq!(config.timeout_secs, Some(9));
        assert_eq!(config.default_threshold, 20);
        assert!(matches!(args.mode, Some(Mode::Schema)));
    }

    #[test]
    fn serve_is_the_default_mode() {
        let args = Args::parse_from(["scc-mcp"]);
        assert!(args.mode.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn detects_broken_pipe_messages() {
        assert!(is_broken_pipe("Broken pipe (os error 32)"));
        assert!(!is_broken_pipe("connection reset"));
    }

    #[test]
    fn tool_description_matches_published_metadata() {
        let tools = SccServer::tool_router().list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, TOOL_NAME);
        assert_eq!(tools[0].description.as_deref(), Some(TOOL_DESCRIPTION));
    }

    #[tokio::test]
    async fn handler_panic_does_not_take_down_the_server() {
        install_panic_hook();

        let joined = tokio::spawn(async {
            if TOOL_NAME == "scc" {
                panic!("handler fault");
            }
        })
        .await;
        assert!(joined.unwrap_err().is_panic());

        let response = run_guarded("analyze", async {
            if TOOL_NAME == "scc" {
                panic!("handler fault");
            }
            Ok(json!({}))
        })
        .await;
        let result = into_call_result(response);
        assert_eq!(result.is_error, Some(true));

        // Still serving after the panic.
        let response = Dispatcher::default()
            .dispatch_value(json!({"command": "nope"}))
            .await;
        assert!(response.is_error);
        assert_eq!(response.payload["error"], "unknown command");
    }

    #[test]
    fn server_advertises_tools() {
        let info = SccServer::new(Dispatcher::default()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "scc-mcp");
    }
}
