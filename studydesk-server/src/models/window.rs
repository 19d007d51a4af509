//! Schedule event time window

use chrono::{DateTime, Utc};

use super::ValidationError;

/// Start/end pair with `starts_at < ends_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        if starts_at >= ends_at {
            return Err(ValidationError::InvalidRange {
                reason: "start time must be before end time",
            });
        }
        Ok(Self { starts_at, ends_at })
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn accepts_ordered_window() {
        let start = Utc::now();
        let window = TimeWindow::new(start, start + Duration::hours(1)).unwrap();
        assert_eq!(window.starts_at(), start);
    }

    #[test]
    fn rejects_equal_bounds() {
        let t = Utc::now();
        assert!(matches!(
            TimeWindow::new(t, t).unwrap_err(),
            ValidationError::InvalidRange { .. }
        ));
    }

    #[test]
    fn rejects_reversed_bounds() {
        let t = Utc::now();
        assert!(TimeWindow::new(t, t - Duration::minutes(5)).is_err());
    }
}
