//! Session timer: a stopwatch for the table, kept in memory only.

use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone)]
pub struct SessionTimer {
    running_since: Option<Instant>,
    accumulated: Duration,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running_since.is_some() {
            return false;
        }
        self.running_since = Some(now);
        true
    }

    /// Pause, keeping the elapsed time. Returns `false` if not running.
    pub fn stop(&mut self, now: Instant) -> bool {
        match self.running_since.take() {
            Some(since) => {
                self.accumulated += now.saturating_duration_since(since);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.running_since = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default()
    }
}

/// `HH:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_pauses() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        assert!(timer.start(t0));
        assert!(!timer.start(t0 + Duration::from_secs(1)));
        assert!(timer.stop(t0 + Duration::from_secs(90)));
        assert!(!timer.stop(t0 + Duration::from_secs(95)));

        assert!(timer.start(t0 + Duration::from_secs(100)));
        assert_eq!(
            timer.elapsed(t0 + Duration::from_secs(130)),
            Duration::from_secs(120)
        );

        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(t0 + Duration::from_secs(200)), Duration::ZERO);
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
    }
}
