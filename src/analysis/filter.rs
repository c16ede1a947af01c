use crate::timestamp::Timestamp;

/// Inclusive timestamp range gate in front of the analyzers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRangeFilter {
    from: Option<Timestamp>,
    to: Option<Timestamp>,
}

impl TimeRangeFilter {
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        Self { from, to }
    }

    /// Both bounds are inclusive; a missing bound does not restrict.
    pub fn accept(&self, ts: &Timestamp) -> bool {
        if let Some(from) = &self.from {
            if ts < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if ts > to {
                return false;
            }
        }
        true
    }

    /// True if either bound is set
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_inclusive_bounds() {
        let filter = TimeRangeFilter::new(
            Some(ts("2026-01-05 10:30:15")),
            Some(ts("2026-01-05 10:30:20")),
        );
        assert!(!filter.accept(&ts("2026-01-05 10:30:10")));
        assert!(filter.accept(&ts("2026-01-05 10:30:15")));
        assert!(filter.accept(&ts("2026-01-05 10:30:17")));
        assert!(filter.accept(&ts("2026-01-05 10:30:20")));
        assert!(!filter.accept(&ts("2026-01-05 10:30:25")));
        assert!(filter.is_active());
    }

    #[test]
    fn test_open_ended_bounds() {
        let from_only = TimeRangeFilter::new(Some(ts("2026-01-05 00:00:00")), None);
        assert!(from_only.accept(&ts("2099-12-31 23:59:59")));
        assert!(!from_only.accept(&ts("2026-01-04 23:59:59")));
        assert!(from_only.is_active());

        let to_only = TimeRangeFilter::new(None, Some(ts("2026-01-05 00:00:00")));
        assert!(to_only.accept(&Timestamp::default()));
        assert!(!to_only.accept(&ts("2026-01-05 00:00:01")));
    }

    #[test]
    fn test_inactive_filter_accepts_everything() {
        let filter = TimeRangeFilter::default();
        assert!(!filter.is_active());
        assert!(filter.accept(&Timestamp::default()));
        assert!(filter.accept(&ts("2026-01-05 10:30:15")));
    }
}
