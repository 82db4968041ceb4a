//! Progress reporting: purely observational, no feedback into the search.

use colored::Colorize;

/// Sink for search progress notifications.
///
/// Implementations must be cheap; they are called from between probes.
pub trait ProgressSink {
    /// The search is `percent` through the given position's value space.
    fn position_progress(&mut self, position: usize, percent: u8);

    /// A digit was finalized at the given position.
    fn digit_chosen(&mut self, position: usize, value: u8);
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn position_progress(&mut self, _position: usize, _percent: u8) {}

    fn digit_chosen(&mut self, _position: usize, _value: u8) {}
}

/// Prints progress lines to stderr with colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn position_progress(&mut self, position: usize, percent: u8) {
        eprintln!(
            "{} position {}: {:>3}%",
            "..".dimmed(),
            position,
            percent
        );
    }

    fn digit_chosen(&mut self, position: usize, value: u8) {
        eprintln!(
            "{} digit[{}] = {}",
            "\u{2713}".green().bold(),
            position,
            format!("{:02}", value).bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records everything it is told.
    #[derive(Debug, Default)]
    pub struct RecordingProgress {
        pub progress: Vec<(usize, u8)>,
        pub digits: Vec<(usize, u8)>,
    }

    impl ProgressSink for RecordingProgress {
        fn position_progress(&mut self, position: usize, percent: u8) {
            self.progress.push((position, percent));
        }

        fn digit_chosen(&mut self, position: usize, value: u8) {
            self.digits.push((position, value));
        }
    }

    #[test]
    fn null_progress_accepts_everything() {
        let mut sink = NullProgress;
        sink.position_progress(0, 50);
        sink.digit_chosen(0, 34);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingProgress::default();
        sink.position_progress(0, 10);
        sink.position_progress(0, 20);
        sink.digit_chosen(0, 34);
        assert_eq!(sink.progress, vec![(0, 10), (0, 20)]);
        assert_eq!(sink.digits, vec![(0, 34)]);
    }
}
