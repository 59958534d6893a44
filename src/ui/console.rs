use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::{Phase, Ui};

/// Line-oriented UI: messages go through `tracing`, progress through an
/// indicatif bar that is suspended while a message is written.
#[derive(Default)]
pub struct ConsoleUi {
    bar: Option<ProgressBar>,
    label: String,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{msg:32} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn emit(&self, f: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        self.emit(|| info!("{}", phase));
    }

    fn set_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.emit(|| debug!("{}", message));
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let label = label.into();
        if self.bar.is_none() || self.label != label {
            self.clear_progress();
            let bar = ProgressBar::new(total);
            bar.set_style(Self::style());
            bar.set_message(label.clone());
            self.bar = Some(bar);
            self.label = label;
        }
        if let Some(bar) = &self.bar {
            bar.set_length(total);
            bar.set_position(current);
        }
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.label.clear();
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.emit(|| info!("{}", message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.emit(|| warn!("{}", message));
    }
}
