use chrono::{DateTime, Duration, Utc};

const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Tracks when the collection was last written so the shell can re-persist it
/// on a fixed interval. An interval of zero disables autosave.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    last_run: DateTime<Utc>,
}

impl AutosaveTimer {
    pub fn new(interval_secs: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            interval: Duration::seconds(interval_secs.min(MAX_INTERVAL_SECS) as i64),
            last_run: started_at,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > Duration::zero()
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_enabled() && now - self.last_run >= self.interval
    }

    /// Restarts the interval from `now`.
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_run = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_after_interval_elapses() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut timer = AutosaveTimer::new(30, start);
        assert!(!timer.is_due(start + Duration::seconds(29)));
        assert!(timer.is_due(start + Duration::seconds(30)));
        timer.mark(start + Duration::seconds(30));
        assert!(!timer.is_due(start + Duration::seconds(45)));
    }

    #[test]
    fn zero_interval_disables() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let timer = AutosaveTimer::new(0, start);
        assert!(!timer.is_enabled());
        assert!(!timer.is_due(start + Duration::days(1)));
    }
}
