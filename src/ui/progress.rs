//! Batch progress with CI fallback

use super::context::UiContext;
use crate::optimize::{JobReport, ProgressObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Shortest redraw interval for the interactive bar
const MIN_TICK: Duration = Duration::from_millis(50);

/// Progress for an optimize batch.
///
/// Shows an indicatif bar in interactive mode and `N/M files done` lines in
/// CI. Optimizer output forwarded in job reports is printed above the bar.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    pub fn new(ctx: &UiContext, total: usize, tick: Duration) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} Optimizing  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.enable_steady_tick(tick.max(MIN_TICK));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    fn print(&self, text: &str) {
        match self.bar {
            Some(ref bar) => bar.println(text),
            None => println!("{}", text),
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

impl ProgressObserver for BatchProgress {
    fn job_done(&mut self, done: usize, total: usize, report: &JobReport) {
        for text in [&report.stdout, &report.stderr].into_iter().flatten() {
            for line in text.lines() {
                self.print(&format!("\t{}", line));
            }
        }

        let name = report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.bar {
            Some(ref bar) => {
                bar.set_position(done as u64);
                bar.set_message(name);
            }
            None => {
                let via = if report.from_cache { " (cache)" } else { "" };
                println!("\t{}/{} files done: {}{}", done, total, name, via);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn batch_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut progress = BatchProgress::new(&ctx, 2, Duration::from_millis(1));
        progress.job_done(
            1,
            2,
            &JobReport {
                path: PathBuf::from("build/a.js"),
                from_cache: true,
                stdout: None,
                stderr: Some("WARN: dropping unused variable".to_string()),
            },
        );
        progress.finish();
        // Should not panic
    }
}
