//! Metrics adapter: runs scc as a subprocess and normalizes its JSON output.
//!
//! Every call spawns exactly one `scc -f json --by-file ... <path>` process.
//! Nothing is cached; each run is parsed fresh.

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::SccConfig;
use crate::error::{MetricsError, MetricsResult};
use crate::types::{AnalysisResult, FileRecord, LanguageGroup};

/// Output of a single scc run.
#[derive(Clone, Debug, Default)]
pub struct RunOutput {
    pub analysis: AnalysisResult,
    /// Groups exactly as parsed from scc, for queries that work on raw data
    pub groups: Vec<LanguageGroup>,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsRunner {
    config: SccConfig,
}

impl MetricsRunner {
    pub fn new(config: SccConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SccConfig {
        &self.config
    }

    fn build_command(&self, path: &str, extra_args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(["-f", "json", "--by-file"])
            .args(&self.config.extra_args)
            .args(extra_args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run scc against `path` and parse its language groups.
    pub async fn run_metrics(&self, path: &str, extra_args: &[String]) -> MetricsResult<RunOutput> {
        debug!(
            "Running {} on {} (extra args: {:?})",
            self.config.binary, path, extra_args
        );

        let mut cmd = self.build_command(path, extra_args);
        let pending = cmd.output();
        let output = match self.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, pending).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(MetricsError::Timeout {
                        path: path.to_string(),
                        secs: limit.as_secs(),
                    });
                }
            },
            None => pending.await,
        }
        .map_err(|source| MetricsError::Spawn {
            binary: self.config.binary.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || stdout.trim().is_empty() {
            return Err(MetricsError::ToolFailed(failure_message(
                path,
                output.status,
                &output.stderr,
            )));
        }

        let groups = parse_groups(&stdout)?;
        let analysis = AnalysisResult::from_groups(&groups);
        debug!(
            "scc reported {} files in {} languages for {}",
            analysis.summary.file_count, analysis.summary.language_count, path
        );

        Ok(RunOutput { analysis, groups })
    }

    /// Analyze a whole project directory.
    pub async fn analyze_project(&self, directory: &str) -> MetricsResult<RunOutput> {
        info!("Analyzing project {}", directory);
        self.run_metrics(directory, &[]).await
    }

    /// Metrics for a single file: the first record scc reports for it.
    pub async fn file_metrics(&self, file_path: &str) -> MetricsResult<FileRecord> {
        let run = self.run_metrics(file_path, &[]).await?;
        run.analysis
            .files
            .into_iter()
            .next()
            .ok_or_else(|| MetricsError::NoMetrics(file_path.to_string()))
    }
}

/// Parse scc's JSON array of language groups.
pub fn parse_groups(raw: &str) -> MetricsResult<Vec<LanguageGroup>> {
    Ok(serde_json::from_str(raw.trim())?)
}

/// Prefer scc's own diagnostics; otherwise say which path failed.
fn failure_message(path: &str, status: ExitStatus, stderr: &[u8]) -> String {
    let diagnostics = String::from_utf8_lossy(stderr);
    let diagnostics = diagnostics.trim();
    if !diagnostics.is_empty() {
        return diagnostics.to_string();
    }
    if status.success() {
        return format!("scc produced no output for {}", path);
    }
    match status.code() {
        Some(code) => format!("scc exited with status {} for {}", code, path),
        None => format!("scc was terminated by a signal while analyzing {}", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_groups_accepts_surrounding_whitespace() {
        let groups = parse_groups("\n  [{\"Name\":\"Go\",\"Files\":[]}]\n").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Go");
    }

    #[test]
    fn parse_groups_rejects_malformed_json() {
        let err = parse_groups("[{\"Name\":").unwrap_err();
        assert!(err.is_fault());
        assert!(err.to_string().starts_with("failed to parse scc output"));
    }

    #[test]
    fn parse_groups_rejects_non_array() {
        assert!(parse_groups("{\"Name\":\"Go\"}").is_err());
    }

    #[test]
    fn command_line_puts_flags_before_path() {
        let runner = MetricsRunner::new(SccConfig {
            extra_args: vec!["--no-gitignore".to_string()],
            ..SccConfig::default()
        });
        let cmd = runner.build_command("/repo", &["--exclude-dir".to_string(), "vendor".to_string()]);
        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-f", "json", "--by-file", "--no-gitignore", "--exclude-dir", "vendor", "/repo"]
        );
        assert_eq!(cmd.as_std().get_program(), "scc");
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::os::unix::process::ExitStatusExt;

        #[test]
        fn stderr_wins_over_synthesized_message() {
            let status = ExitStatus::from_raw(2 << 8);
            assert_eq!(failure_message("/repo", status, b"  bad flag\n"), "bad flag");
        }

        #[test]
        fn empty_output_names_the_path() {
            let status = ExitStatus::from_raw(0);
            assert_eq!(
                failure_message("/repo", status, b""),
                "scc produced no output for /repo"
            );
        }

        #[test]
        fn non_zero_exit_names_status_and_path() {
            let status = ExitStatus::from_raw(3 << 8);
            assert_eq!(
                failure_message("/repo", status, b""),
                "scc exited with status 3 for /repo"
            );
        }
    }
}
