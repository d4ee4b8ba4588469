//! Live progress display while repositories are processed

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::config::PROGRESS_TEMPLATE;

/// Creates a progress bar style configuration
/// Falls back to the plain default if the template is rejected
pub(crate) fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(PROGRESS_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Creates the completion counter shown on stderr.
///
/// Hidden in quiet mode; indicatif also stays silent when stderr is not a
/// terminal, so piped output only ever contains the report.
pub fn create_progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    pb.set_style(create_progress_style());
    pb
}
