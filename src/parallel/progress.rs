use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a batch of conversions, driven by the executor's
/// `(current, total, worker_id)` callbacks.
#[derive(Clone)]
pub struct ConversionProgress {
    bar: ProgressBar,
}

impl ConversionProgress {
    pub fn new(total: usize, label: &str) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    /// A bar that draws nothing, for quiet and machine-readable output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Callback suitable for `ExecutionStrategy::execute`
    pub fn reporter(&self) -> impl Fn(usize, usize, usize) + Send + Sync + 'static {
        let bar = self.bar.clone();
        // called exactly once per finished item, in completion order
        move |_current, _total, worker_id| {
            bar.inc(1);
            bar.set_message(format!("[worker-{}]", worker_id + 1));
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
