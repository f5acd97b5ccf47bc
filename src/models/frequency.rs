//! Mapping from human frequency labels to scheduling durations.

use std::time::Duration;

/// The delivery frequency of an alert, parsed from its stored label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFrequency {
    /// "Instant notification": checked every 5 minutes.
    Instant,
    /// "1 Hour".
    OneHour,
    /// "6 Hours".
    SixHours,
    /// "12 Hours".
    TwelveHours,
    /// "24 Hours".
    TwentyFourHours,
    /// Any other or missing label falls back to a 1 minute cadence.
    Fallback,
}

/// The resolved scheduling parameters for one frequency.
///
/// The initial delay equals the repeat interval so the very first run only
/// fires once a full period has elapsed; the default lookback is used only
/// when the alert has no cursor yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencySchedule {
    /// Time between recurring runs.
    pub repeat_interval: Duration,
    /// One-shot warm-up delay before the first run.
    pub initial_delay: Duration,
    /// Window size for an alert's first-ever run.
    pub default_lookback: chrono::Duration,
}

impl AlertFrequency {
    /// Parses a stored frequency label. Unknown labels map to `Fallback`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Instant notification" => Self::Instant,
            "1 Hour" => Self::OneHour,
            "6 Hours" => Self::SixHours,
            "12 Hours" => Self::TwelveHours,
            "24 Hours" => Self::TwentyFourHours,
            _ => Self::Fallback,
        }
    }

    /// The repeat interval, initial delay and default lookback in minutes.
    fn minutes(&self) -> u64 {
        match self {
            Self::Instant => 5,
            Self::OneHour => 60,
            Self::SixHours => 360,
            Self::TwelveHours => 720,
            Self::TwentyFourHours => 1440,
            Self::Fallback => 1,
        }
    }

    /// Returns the scheduling parameters for this frequency.
    pub fn schedule(&self) -> FrequencySchedule {
        let minutes = self.minutes();
        FrequencySchedule {
            repeat_interval: Duration::from_secs(minutes * 60),
            initial_delay: Duration::from_secs(minutes * 60),
            default_lookback: chrono::Duration::minutes(minutes as i64),
        }
    }

    /// Resolves a label directly to its schedule.
    pub fn resolve(label: &str) -> FrequencySchedule {
        Self::from_label(label).schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_labels() {
        let cases = [
            ("Instant notification", 5u64),
            ("1 Hour", 60),
            ("6 Hours", 360),
            ("12 Hours", 720),
            ("24 Hours", 1440),
        ];
        for (label, minutes) in cases {
            let schedule = AlertFrequency::resolve(label);
            assert_eq!(
                schedule.repeat_interval,
                Duration::from_secs(minutes * 60),
                "repeat interval for {label}"
            );
            assert_eq!(
                schedule.initial_delay,
                Duration::from_secs(minutes * 60),
                "initial delay for {label}"
            );
            assert_eq!(
                schedule.default_lookback,
                chrono::Duration::minutes(minutes as i64),
                "default lookback for {label}"
            );
        }
    }

    #[test]
    fn test_unknown_labels_fall_back_to_one_minute() {
        for label in ["", "weekly", "1 hour", "Every day"] {
            let schedule = AlertFrequency::resolve(label);
            assert_eq!(schedule.repeat_interval, Duration::from_secs(60));
            assert_eq!(schedule.initial_delay, Duration::from_secs(60));
            assert_eq!(schedule.default_lookback, chrono::Duration::minutes(1));
        }
    }

    #[test]
    fn test_initial_delay_equals_repeat_interval() {
        for label in ["Instant notification", "1 Hour", "6 Hours", "12 Hours", "24 Hours", "other"]
        {
            let schedule = AlertFrequency::resolve(label);
            assert_eq!(schedule.initial_delay, schedule.repeat_interval);
        }
    }
}
