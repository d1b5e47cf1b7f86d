//! Terminal display for the subdomain-extractor CLI.
//!
//! Everything here writes to stderr so stdout stays a clean list of
//! subdomains. Uses only the `console` crate.

use console::{style, Term};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use subdomain_extractor_lib::{ExtractConfig, RunStats, StatsSnapshot};

// ── Progress ─────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async spinner with a `Processing n/total` counter, redrawn from the
/// run's live stats and cleared on stop.
pub struct Progress {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Progress {
    /// Start drawing. Returns `None` if stderr isn't a TTY.
    pub fn start(stats: Arc<RunStats>, total: usize) -> Option<Self> {
        if !console::user_attended_stderr() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let line = format_progress(&stats.snapshot(), total);
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), line));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

/// Text of the progress line, without the spinner frame.
pub fn format_progress(snapshot: &StatsSnapshot, total: usize) -> String {
    format!(
        "Processing {}/{}  ({} found)",
        snapshot.completed().min(total),
        total,
        snapshot.emitted
    )
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a short run header (verbose mode).
pub fn print_header(domain: &str, url_count: usize, config: &ExtractConfig) {
    eprintln!(
        "{} {} {}",
        style("subdomain-extractor").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- {} URL{} for *.{}",
            url_count,
            if url_count == 1 { "" } else { "s" },
            domain
        ))
        .dim(),
    );

    let mut meta_parts = vec![
        format!("Threads: {}", config.max_threads),
        format!("RPS: {}", config.max_rps),
    ];
    if let Some(timeout) = config.timeout {
        meta_parts.push(format!("Timeout: {}s", timeout.as_secs()));
    }
    if config.insecure {
        meta_parts.push("TLS verification: off".to_string());
    }

    eprintln!("{}", style(meta_parts.join(" | ")).dim());
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the end-of-run summary (verbose mode).
pub fn print_summary(snapshot: &StatsSnapshot, duration: Duration) {
    eprintln!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    eprintln!("  {}", format_summary(snapshot, duration));
}

pub fn format_summary(snapshot: &StatsSnapshot, duration: Duration) -> String {
    format!(
        "{} URL{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(snapshot.dispatched).bold(),
        if snapshot.dispatched == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} fetched", snapshot.fetched)).green(),
        style("|").dim(),
        style(format!("{} failed", snapshot.failed)).red(),
        style("|").dim(),
        style(format!("{} subdomains", snapshot.emitted)).cyan(),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fetched: usize, failed: usize, emitted: usize) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: fetched + failed,
            fetched,
            failed,
            emitted,
        }
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(
            format_progress(&snapshot(2, 1, 5), 10),
            "Processing 3/10  (5 found)"
        );
    }

    #[test]
    fn test_format_progress_never_overshoots_total() {
        assert_eq!(
            format_progress(&snapshot(4, 0, 0), 3),
            "Processing 3/3  (0 found)"
        );
    }

    #[test]
    fn test_format_summary_counts() {
        console::set_colors_enabled(false);
        let summary = format_summary(&snapshot(3, 1, 7), Duration::from_millis(1500));
        assert_eq!(
            summary,
            "4 URLs in 1.5s  |  3 fetched  |  1 failed  |  7 subdomains"
        );
    }
}
