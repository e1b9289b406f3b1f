//! Terminal UI components and styling for vremix.
//!
//! Output follows a small visual hierarchy (sections, processing steps,
//! status lines) printed through the `log` facade so it shares the
//! logger's stream. The batch progress bar is drawn with indicatif.

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::io::IsTerminal;
use std::time::Duration;

const STATUS_INDENT: &str = "    ";
const LABEL_WIDTH: usize = 15;

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", style(title.to_uppercase()).cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a processing step
pub fn print_processing(message: &str) {
    if should_use_color() {
        info!("  » {}", style(message).bold());
    } else {
        info!("  » {message}");
    }
}

/// Formats a `label: value` status line.
pub fn format_status(label: &str, value: &str) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
    format!("{STATUS_INDENT}{label}:{} {value}", " ".repeat(padding))
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    if should_use_color() && highlight {
        let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
        info!(
            "{STATUS_INDENT}{label}:{} {}",
            " ".repeat(padding),
            style(value).bold()
        );
    } else {
        info!("{}", format_status(label, value));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("  ✓ {}", style(message).green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", style(message).yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print a per-file failure
pub fn print_failure(title: &str, message: &str) {
    if should_use_color() {
        info!("  ✗ {}", style(title).red().bold());
    } else {
        info!("  ✗ {title}");
    }
    info!("{STATUS_INDENT}{message}");
}

/// Progress over the files of a batch.
///
/// Hidden when stderr is not a terminal. Lines printed while the bar is
/// visible go through [`BatchProgress::suspend`] so they do not tear it.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_files: usize) -> Self {
        let bar = ProgressBar::new(total_files as u64);

        let term_width = Term::stderr().size().1 as usize;
        let template = if term_width >= 80 {
            "  ⧖ Remixing: {pos}/{len} [{bar:30}] ({elapsed_precise}, ETA {eta_precise})"
        } else {
            "  ⧖ {pos}/{len} [{bar:15}]"
        };
        if let Ok(progress_style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(progress_style.progress_chars("##."));
        }

        if !std::io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.enable_steady_tick(Duration::from_millis(200));
        }

        Self { bar }
    }

    /// Runs `f` with the bar cleared from the screen.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Marks one more file as done.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Removes the bar once the batch is over.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_status_alignment() {
        assert_eq!(
            format_status("Output", "a.mp4"),
            format!("    Output:{}a.mp4", " ".repeat(10))
        );
        // Long labels still get one space
        let line = format_status("A very long status label", "x");
        assert!(line.ends_with("label:  x"));
    }

    #[test]
    fn test_batch_progress_counts() {
        let progress = BatchProgress::new(3);
        progress.inc();
        progress.suspend(|| ());
        progress.inc();
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}
