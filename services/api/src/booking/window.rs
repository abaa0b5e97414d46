//! Half-open booking window
//!
//! A `Window` covers `[start, end)`. Two windows overlap iff each one
//! starts before the other ends; windows that merely touch (one ends
//! exactly where the other starts) do not overlap.

use chrono::{DateTime, Duration, Utc};

use crate::error::ApiError;

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Validated half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// Build a window, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ApiError> {
        if end <= start {
            return Err(ApiError::Validation(
                "End time must be after start time".to_string(),
            ));
        }
        Ok(Window { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Standard half-open overlap test.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of billable hours, rounded up.
    pub fn hours_ceil(&self) -> i64 {
        (self.duration().num_seconds() + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR
    }

    /// Number of billable days, rounded up.
    pub fn days_ceil(&self) -> i64 {
        (self.duration().num_seconds() + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }

    /// Number of billable months under the flat 30-day divisor.
    pub fn months_floor(&self) -> i64 {
        self.duration().num_days() / 30
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::Rng;

    fn at(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn window(start_hour: i64, end_hour: i64) -> Window {
        Window::new(at(start_hour), at(end_hour)).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_windows() {
        assert!(matches!(
            Window::new(at(5), at(5)),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            Window::new(at(5), at(3)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn overlap_basic_cases() {
        let a = window(0, 4);
        assert!(a.overlaps(&window(2, 6)));
        assert!(a.overlaps(&window(1, 3)));
        assert!(a.overlaps(&window(0, 4)));
        assert!(!a.overlaps(&window(5, 8)));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = window(0, 4);
        assert!(!a.overlaps(&window(4, 8)));
        assert!(!window(4, 8).overlaps(&a));
    }

    #[test]
    fn overlap_is_symmetric_on_random_pairs() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let a_start = rng.gen_range(0..200);
            let a_end = rng.gen_range(a_start + 1..=220);
            let b_start = rng.gen_range(0..200);
            let b_end = rng.gen_range(b_start + 1..=220);

            let a = window(a_start, a_end);
            let b = window(b_start, b_end);

            assert_eq!(a.overlaps(&b), b.overlaps(&a));
            let expected = a_start.max(b_start) < a_end.min(b_end);
            assert_eq!(a.overlaps(&b), expected);
        }
    }

    // Admitting random windows greedily through the overlap predicate
    // must leave the accepted set pairwise disjoint.
    #[test]
    fn admitted_windows_never_overlap() {
        let mut rng = rand::thread_rng();
        let mut admitted: Vec<Window> = Vec::new();

        for _ in 0..500 {
            let start = rng.gen_range(0..500);
            let end = rng.gen_range(start + 1..=520);
            let candidate = window(start, end);

            if admitted.iter().all(|w| !w.overlaps(&candidate)) {
                admitted.push(candidate);
            }
        }

        for (i, a) in admitted.iter().enumerate() {
            for b in admitted.iter().skip(i + 1) {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn duration_rounding() {
        assert_eq!(window(0, 1).hours_ceil(), 1);
        let ninety_minutes = Window::new(at(0), at(0) + Duration::minutes(90)).unwrap();
        assert_eq!(ninety_minutes.hours_ceil(), 2);

        assert_eq!(window(0, 24).days_ceil(), 1);
        assert_eq!(window(0, 25).days_ceil(), 2);
        assert_eq!(window(0, 48).days_ceil(), 2);

        assert_eq!(window(0, 29 * 24).months_floor(), 0);
        assert_eq!(window(0, 30 * 24).months_floor(), 1);
        assert_eq!(window(0, 65 * 24).months_floor(), 2);
    }
}
