//! # scc-metrics
//!
//! Structured queries over [scc](https://github.com/boyter/scc) output.
//!
//! The crate shells out to `scc -f json --by-file`, normalizes the language
//! groups it prints, and serves four commands on top:
//!
//! - **analyze** - totals, per-language table and file count for a directory
//! - **hotspots** - files whose complexity meets a threshold, most complex first
//! - **file** - metrics for a single file
//! - **compare** - two projects side by side with B minus A differences
//!
//! It is transport-agnostic: mount a [`Dispatcher`] in any host (the
//! `scc-mcp` server is one) or call it directly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scc_metrics::{CommandArgs, Dispatcher, SccConfig};
//!
//! # async fn demo() {
//! let dispatcher = Dispatcher::new(SccConfig::default());
//! let response = dispatcher
//!     .dispatch(CommandArgs {
//!         command: "hotspots".to_string(),
//!         path: Some(".".to_string()),
//!         threshold: Some(10.0),
//!         ..Default::default()
//!     })
//!     .await;
//! println!("{}", response.to_text());
//! # }
//! ```

/// Command parsing, dispatch and the response envelope.
pub mod command;

/// `.scc-mcp/config.toml` loading.
pub mod config;

/// Summary comparison between two projects.
pub mod diff;

pub mod error;

/// Complexity hotspot filtering.
pub mod hotspots;

/// The scc subprocess adapter.
pub mod runner;

/// Tool name, description and input schema.
pub mod tool;

/// scc output types and derived views.
pub mod types;

pub use command::{
    COMMAND_NAMES, Command, CommandArgs, CommandError, Dispatcher, Response, run_guarded,
};
pub use config::SccConfig;
pub use diff::{ProjectComparison, ProjectDiff};
pub use error::{MetricsError, MetricsResult};
pub use hotspots::complexity_hotspots;
pub use runner::{MetricsRunner, RunOutput, parse_groups};
pub use types::{
    AnalysisResult, DEFAULT_HOTSPOT_THRESHOLD, FileRecord, HotspotRecord, LanguageGroup,
    LanguageMetrics, Summary,
};
