use chrono::{DateTime, Timelike, Utc};
use configuration::SessionWindow;

/// Restricts evaluation to configured UTC hour windows.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    windows: Vec<SessionWindow>,
}

impl SessionGate {
    pub fn new(windows: Vec<SessionWindow>) -> Self {
        Self { windows }
    }

    /// True when `now` falls inside any window, or when no windows are configured.
    pub fn in_session(&self, now: DateTime<Utc>) -> bool {
        let hour = now.hour();
        self.windows.is_empty()
            || self
                .windows
                .iter()
                .any(|w| (w.start_hour..w.end_hour).contains(&hour))
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 30, 0).unwrap()
    }

    #[test]
    fn morning_and_peak_blocks() {
        let gate = SessionGate::new(vec![
            SessionWindow { start_hour: 8, end_hour: 12 },
            SessionWindow { start_hour: 13, end_hour: 16 },
        ]);
        assert!(!gate.in_session(at(7)));
        assert!(gate.in_session(at(8)));
        assert!(gate.in_session(at(11)));
        assert!(!gate.in_session(at(12)));
        assert!(gate.in_session(at(15)));
        assert!(!gate.in_session(at(16)));
    }

    #[test]
    fn no_windows_means_always_open() {
        assert!(SessionGate::default().in_session(at(3)));
    }
}
