//! Progress reporter implementation
//!
//! Uses indicatif for a phase spinner and console for styled outcome lines:
//! - Distinct marker per outcome (success, skip, warning, failure, backup)
//! - Atomic outcome counters for the final summary
//! - Hidden output for quiet mode

use console::{style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Kind of outcome being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Operation completed
    Success,
    /// Operation intentionally not performed
    Skipped,
    /// Non-fatal problem
    Warning,
    /// Operation failed
    Failure,
    /// Backup created
    Backup,
    /// Informational note
    Info,
}

impl Marker {
    /// Symbol printed in front of the message
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Skipped => "⏭️ ",
            Self::Warning => "⚠️ ",
            Self::Failure => "❌",
            Self::Backup => "📋",
            Self::Info => "📝",
        }
    }

    fn styled(&self) -> StyledObject<&'static str> {
        let symbol = style(self.symbol());
        match self {
            Self::Success => symbol.green(),
            Self::Skipped => symbol.dim(),
            Self::Warning => symbol.yellow(),
            Self::Failure => symbol.red().bold(),
            Self::Backup | Self::Info => symbol.cyan(),
        }
    }
}

/// Progress reporter for setup phases
pub struct ProgressReporter {
    /// Current phase spinner
    spinner: ProgressBar,
    /// Output terminal for outcome lines
    term: Term,
    /// Start time
    start_time: Instant,
    successes: AtomicU64,
    skips: AtomicU64,
    warnings: AtomicU64,
    failures: AtomicU64,
    backups: AtomicU64,
    /// Is output enabled
    enabled: AtomicBool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        Self {
            spinner,
            term: Term::stdout(),
            start_time: Instant::now(),
            successes: AtomicU64::new(0),
            skips: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            backups: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        let reporter = Self::new();
        reporter.enabled.store(false, Ordering::SeqCst);
        reporter.spinner.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Check if output is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Announce a numbered phase
    pub fn start_phase(&self, step: usize, title: &str) {
        self.write_line(&format!("\n{} {}", style(format!("[{step}]")).bold(), title));
        self.spinner.set_message(title.to_string());
        self.spinner.tick();
    }

    /// Print a plain line
    pub fn line(&self, text: &str) {
        self.write_line(text);
    }

    /// Report an outcome with its marker
    pub fn report(&self, marker: Marker, message: &str) {
        let counter = match marker {
            Marker::Success => Some(&self.successes),
            Marker::Skipped => Some(&self.skips),
            Marker::Warning => Some(&self.warnings),
            Marker::Failure => Some(&self.failures),
            Marker::Backup => Some(&self.backups),
            Marker::Info => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        self.write_line(&format!("{} {}", marker.styled(), message));
    }

    /// Report a success
    pub fn success(&self, message: &str) {
        self.report(Marker::Success, message);
    }

    /// Report a skipped operation
    pub fn skipped(&self, message: &str) {
        self.report(Marker::Skipped, message);
    }

    /// Report a warning
    pub fn warning(&self, message: &str) {
        self.report(Marker::Warning, message);
    }

    /// Report a failure
    pub fn failure(&self, message: &str) {
        self.report(Marker::Failure, message);
    }

    /// Report a created backup
    pub fn backup(&self, message: &str) {
        self.report(Marker::Backup, message);
    }

    /// Report an informational note
    pub fn info(&self, message: &str) {
        self.report(Marker::Info, message);
    }

    /// Finish progress with success message
    pub fn finish_success(&self, message: &str) {
        self.spinner.finish_and_clear();
        self.write_line(&format!("\n🎉 {}", style(message).green().bold()));
    }

    /// Finish progress with error message
    pub fn finish_error(&self, message: &str) {
        self.spinner.abandon();
        self.write_line(&format!("\n{} {}", Marker::Failure.styled(), style(message).red()));
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get outcome summary
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            successes: self.successes.load(Ordering::Relaxed),
            skips: self.skips.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            backups: self.backups.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }

    fn write_line(&self, text: &str) {
        if !self.is_enabled() {
            return;
        }
        self.spinner.suspend(|| {
            let _ = self.term.write_line(text);
        });
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome counters for a whole run
#[derive(Debug, Clone)]
pub struct OutcomeSummary {
    /// Successful operations
    pub successes: u64,
    /// Skipped operations
    pub skips: u64,
    /// Warnings
    pub warnings: u64,
    /// Failed operations
    pub failures: u64,
    /// Backups created
    pub backups: u64,
    /// Elapsed time
    pub elapsed: Duration,
}

impl OutcomeSummary {
    /// Render the summary as display lines
    pub fn lines(&self) -> Vec<String> {
        // Millisecond precision keeps humantime output short
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        vec![
            format!("Succeeded: {}", self.successes),
            format!("Skipped:   {}", self.skips),
            format!("Warnings:  {}", self.warnings),
            format!("Failed:    {}", self.failures),
            format!("Backups:   {}", self.backups),
            format!("Elapsed:   {}", humantime::format_duration(elapsed)),
        ]
    }
}
