use crate::api::{ProgressCallback, ProgressEvent};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct ProgressBarBuilder {
    style_template: &'static str,
    message: String,
    length: Option<u64>,
    enable_tick: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            style_template: "{spinner:.green} {msg}",
            message: message.into(),
            length: None,
            enable_tick: false,
        }
    }

    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.style_template = template;
        self
    }

    /// Switches from a spinner to a bar of the given length.
    pub(crate) fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub(crate) fn with_tick(mut self) -> Self {
        self.enable_tick = true;
        self
    }

    pub(crate) fn build(self) -> Result<ProgressBar> {
        let pb = match self.length {
            Some(length) => ProgressBar::new(length),
            None => ProgressBar::new_spinner(),
        };

        let style = match self.length {
            Some(_) => ProgressStyle::default_bar()
                .template(self.style_template)?
                .progress_chars("#>-"),
            None => ProgressStyle::default_spinner().template(self.style_template)?,
        };
        pb.set_style(style);
        pb.set_message(self.message);

        if self.enable_tick {
            pb.enable_steady_tick(Duration::from_millis(120));
        }

        Ok(pb)
    }
}

/// Drives a progress bar from analyzer progress events.
pub(crate) fn progress_callback(pb: ProgressBar) -> ProgressCallback {
    Arc::new(move |event| match event {
        ProgressEvent::Started { task, total } => {
            pb.set_length(total);
            pb.set_position(0);
            pb.set_message(task);
        }
        ProgressEvent::Progress { current, .. } => pb.set_position(current),
        ProgressEvent::Completed { task } => pb.finish_with_message(format!("{} done", task)),
        ProgressEvent::Error { error, .. } => pb.println(format!("Skipped {}", error)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_tracks_events() {
        let pb = ProgressBarBuilder::new("Ranking")
            .with_template("{bar:20} {pos}/{len} {msg}")
            .with_length(0)
            .build()
            .unwrap();
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        let callback = progress_callback(pb.clone());
        callback(ProgressEvent::Started {
            task: "Partner ranking".to_string(),
            total: 4,
        });
        callback(ProgressEvent::Progress {
            task: "Partner ranking".to_string(),
            current: 3,
            total: 4,
        });

        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 3);

        callback(ProgressEvent::Completed {
            task: "Partner ranking".to_string(),
        });
        assert!(pb.is_finished());
    }
}
