//! Output module
//!
//! Result sinks used by the batch commands: colored console lines on stdout
//! and an append-only JSON-lines log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use devop_core::domain::job::{JobHandle, JobResult};
use devop_runner::{BatchReport, DispatchFailure, ResultSink};

/// Prints progress and results as they happen
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn on_dispatched(&mut self, handle: &JobHandle) {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            handle.identifier,
            format!("({})", handle.id).dimmed()
        );
    }

    fn on_dispatch_failed(&mut self, failure: &DispatchFailure) {
        println!(
            "  {} {} {}",
            "✗".red(),
            failure.identifier.red(),
            format!("{:#}", failure.error).red()
        );
    }

    fn record(&mut self, result: &JobResult) -> Result<()> {
        println!("{}", render_result(result));
        Ok(())
    }
}

/// One line per result, green on success and red otherwise
pub fn render_result(result: &JobResult) -> String {
    let mut line = format!("{} {}", result.identifier, result.state);
    if !result.description.is_empty() {
        line.push_str(&format!(" - {}", result.description));
    }
    line.push_str(&format!(". Duration: {}", result.duration));
    if let Some(error) = &result.error_message {
        line.push_str(&format!(" Error: {}", error));
    }

    let mut rendered = if result.is_success() {
        format!("{} {}", "✓".green(), line.green())
    } else {
        format!("{} {}", "✗".red(), line.red())
    };

    if let Some(url) = &result.web_url {
        rendered.push_str(&format!("\n    {}", url.dimmed()));
    }
    rendered
}

/// Appends every result to a file as one JSON object per line
pub struct LogFileSink {
    file: File,
}

impl LogFileSink {
    /// Opens `path` for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self { file })
    }
}

impl ResultSink for LogFileSink {
    fn record(&mut self, result: &JobResult) -> Result<()> {
        let line = serde_json::to_string(result).context("Failed to serialize result")?;
        writeln!(self.file, "{}", line).context("Failed to write to log file")?;
        self.file.flush().context("Failed to flush log file")
    }
}

/// Console sink plus a log file sink when `log_file` is given
pub fn sinks(log_file: Option<&Path>) -> Result<Vec<Box<dyn ResultSink>>> {
    let mut sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(ConsoleSink)];
    if let Some(path) = log_file {
        sinks.push(Box::new(LogFileSink::open(path)?));
    }
    Ok(sinks)
}

/// Prints the batch totals
pub fn print_summary(report: &BatchReport) {
    let total = report.results.len();
    let succeeded = report.succeeded();

    println!();
    let summary = format!("{}/{} succeeded", succeeded, total);
    if succeeded == total {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }

    if !report.all_dispatched() {
        println!(
            "{}",
            format!("{} not dispatched", report.dispatch_failures.len())
                .red()
                .bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devop_core::domain::job::{JobOutcome, JobState};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn result(succeeded: bool) -> JobResult {
        JobResult::from_outcome(
            &JobHandle::new("payments", "ServerTasks-900"),
            JobOutcome {
                succeeded,
                status: if succeeded { "Success" } else { "Failed" }.to_string(),
                description: "Deploy payments release 2.3.1 to Staging".to_string(),
                duration: Some("42 seconds".to_string()),
                error_message: (!succeeded).then(|| "Step 2 failed".to_string()),
                web_url: None,
            },
            Duration::from_secs(42),
        )
    }

    #[test]
    fn test_render_success() {
        colored::control::set_override(false);
        assert_eq!(
            render_result(&result(true)),
            "✓ payments succeeded - Deploy payments release 2.3.1 to Staging. Duration: 42 seconds"
        );
    }

    #[test]
    fn test_render_failure_includes_error() {
        colored::control::set_override(false);
        let rendered = render_result(&result(false));
        assert!(rendered.starts_with("✗ payments failed"));
        assert!(rendered.ends_with("Error: Step 2 failed"));
    }

    #[test]
    fn test_log_file_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deploy.log");
        fs::write(&path, "earlier run\n").unwrap();

        let mut sink = LogFileSink::open(&path).unwrap();
        sink.record(&result(true)).unwrap();
        sink.record(&result(false)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier run");

        let logged: JobResult = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(logged.state, JobState::Failed);
        assert_eq!(logged.identifier, "payments");
    }
}
