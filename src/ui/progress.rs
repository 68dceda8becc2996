use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a load of `total` vacancy records.
///
/// Hidden when stdout is not a terminal.
pub fn ingest_progress(total: usize) -> ProgressBar {
    if !console::Term::stdout().is_term() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64).with_message("Ingesting vacancies");
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len} ({elapsed})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
