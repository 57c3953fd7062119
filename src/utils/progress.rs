//! Terminal progress indicators.
//!
//! Build passes show a spinner while the compiler runs. Spinners are hidden
//! when `--no-progress` or `--quiet` is given, when stderr is not a terminal
//! (indicatif's own detection), or when `STYLEGRAPH_NO_PROGRESS` is set.
//!
//! ```rust,no_run
//! use stylegraph::utils::progress::Spinner;
//!
//! let spinner = Spinner::new("Compiling components", true);
//! // ... long running work ...
//! spinner.finish_with_message("Compiled 12 components");
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable disabling every progress indicator.
pub const NO_PROGRESS_ENV: &str = "STYLEGRAPH_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Spinner for work of unknown length.
#[derive(Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Start a spinner showing `message`. A disabled spinner draws nothing.
    pub fn new(message: impl Into<String>, enabled: bool) -> Self {
        let inner = if enabled && !is_progress_disabled() {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        inner.set_message(message.into());
        Self {
            inner,
        }
    }

    /// Replace the message.
    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.set_message(message.into());
    }

    /// Stop and leave `message` on screen.
    pub fn finish_with_message(&self, message: impl Into<String>) {
        self.inner.finish_with_message(message.into());
    }

    /// Stop and erase the spinner line.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether nothing is drawn.
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
