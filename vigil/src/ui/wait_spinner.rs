use std::time::Duration;

/// A spinner on stderr while a wait is in progress. Hidden when stderr is not
/// a terminal.
pub struct WaitSpinner {
    inner: indicatif::ProgressBar,
}

impl WaitSpinner {
    pub fn start(message: impl Into<String>) -> Self {
        let inner = indicatif::ProgressBar::new_spinner();
        if let Ok(style) =
            indicatif::ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
        {
            inner.set_style(style);
        }
        inner.set_message(message.into());
        inner.enable_steady_tick(Duration::from_millis(120));
        Self { inner }
    }

    pub fn finish(self) { self.inner.finish_and_clear(); }
}
