//! Spinner helpers using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Clock-face spinner frames.
const CLOCK_SPINNER: &[&str] = &["◴ ", "◷ ", "◶ ", "◵ "];

fn spinner_style(template: &str) -> ProgressStyle {
    // Templates are literals below; fall back to the default on a bad one
    ProgressStyle::default_spinner()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Creates a new spinner with a message.
///
/// Hidden automatically when stdout is not a terminal.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    pb.set_style(spinner_style("{spinner:.cyan} {msg}").tick_strings(CLOCK_SPINNER));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));

    pb
}

/// Finishes a spinner and clears it from the terminal.
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
