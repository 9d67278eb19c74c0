//! Progress reporting for the loader.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use centralsearch_shared::Progress;

/// Receives cumulative `(completed, total)` updates during a load.
pub trait ProgressSink: Send + Sync {
    /// Report the latest progress. `total` may still be unknown.
    fn update(&self, progress: Progress);

    /// Called once after the last update.
    fn finish(&self, _progress: Progress) {}
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _progress: Progress) {}
}

/// Reports progress as structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&self, progress: Progress) {
        info!(
            completed = progress.completed,
            total = ?progress.total,
            "Load progress"
        );
    }

    fn finish(&self, progress: Progress) {
        info!(
            completed = progress.completed,
            total = ?progress.total,
            "Load finished"
        );
    }
}

/// Terminal progress bar.
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new() -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message("Copying...");
        Self { bar }
    }
}

impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBarSink {
    fn update(&self, progress: Progress) {
        if let Some(total) = progress.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(progress.completed);
    }

    fn finish(&self, progress: Progress) {
        self.update(progress);
        self.bar.finish_with_message("Done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_tracks_total() {
        let sink = ProgressBarSink {
            bar: ProgressBar::hidden(),
        };

        sink.update(Progress::new(3, None));
        assert_eq!(sink.bar.position(), 3);
        assert_eq!(sink.bar.length(), None);

        sink.update(Progress::new(5, Some(10)));
        sink.finish(Progress::new(10, Some(10)));
        assert_eq!(sink.bar.position(), 10);
        assert_eq!(sink.bar.length(), Some(10));
        assert!(sink.bar.is_finished());
    }
}
