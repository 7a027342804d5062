//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to display a spinner or progress bar on stderr for
//! each phase of a run (walking, hashing, organizing, removing).
//!
//! Phases run one after another, so a single active bar is tracked at a time.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name for directory walking.
pub const PHASE_WALKING: &str = "walking";
/// Phase name for content hashing.
pub const PHASE_HASHING: &str = "hashing";
/// Phase name for the extension organizer.
pub const PHASE_ORGANIZING: &str = "organizing";
/// Phase name for duplicate removal.
pub const PHASE_REMOVING: &str = "removing";

/// Progress callback for the phases of a run.
///
/// Implement this trait to receive progress updates.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "walking", "hashing")
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupesort::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            active: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn label(phase: &str) -> &'static str {
        match phase {
            PHASE_WALKING => "Walking directory",
            PHASE_HASHING => "Hashing",
            PHASE_ORGANIZING => "Organizing",
            PHASE_REMOVING => "Removing duplicates",
            _ => "Working",
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            pb
        };
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_message(Self::label(phase));

        if let Ok(mut active) = self.active.lock() {
            if let Some(previous) = active.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Ok(active) = self.active.lock() {
            if let Some(pb) = active.as_ref() {
                pb.set_position(current as u64);
                log::trace!("progress {}: {}", current, path);
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(pb) = active.take() {
                pb.finish_and_clear();
                log::debug!("Phase '{}' finished after {:?}", phase, pb.elapsed());
            }
        }
    }
}
