/*!
 * Progress reporting for document translation.
 *
 * The pipeline reports `(current, total)` after every chunk and short status
 * messages at stage changes. Reporters must tolerate being called from the
 * translation task; they never fail.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::fmt::Debug;

/// Sink for pipeline progress
pub trait ProgressReporter: Send + Sync + Debug {
    /// Called after chunk `current` of `total` resolved
    fn report(&self, current: usize, total: usize);

    /// Called with a human readable status line
    fn status(&self, message: &str);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _current: usize, _total: usize) {}

    fn status(&self, _message: &str) {}
}

/// Reporter that writes progress to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, current: usize, total: usize) {
        info!("Translated {}/{} chunks", current, total);
    }

    fn status(&self, message: &str) {
        debug!("{}", message);
    }
}

/// Reporter drawing an indicatif progress bar on the terminal
#[derive(Debug)]
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    /// Create a hidden-length bar; the length is set on the first report
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar.set_message("Translating");
        Self { bar }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Underlying bar, for suspending output around log lines
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn report(&self, current: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
    }

    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}
