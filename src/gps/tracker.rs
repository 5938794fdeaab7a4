// src/gps/tracker.rs
//! Change tracking for individual field groups

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A value paired with the time of its last refresh and whether the most
/// recent write altered it.
///
/// All mutation goes through [`ChangeTracker::set`], so `changed` always
/// describes the latest write and `last_refresh` never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeTracker<T> {
    value: T,
    changed: bool,
    last_refresh: DateTime<Utc>,
}

impl<T: PartialEq> ChangeTracker<T> {
    pub fn new(value: T) -> Self {
        Self::new_at(value, Utc::now())
    }

    pub fn new_at(value: T, now: DateTime<Utc>) -> Self {
        Self {
            value,
            changed: false,
            last_refresh: now,
        }
    }

    /// Store a new value, stamping the refresh time even if it is unchanged.
    pub fn set(&mut self, value: T) {
        self.set_at(value, Utc::now());
    }

    pub fn set_at(&mut self, value: T, now: DateTime<Utc>) {
        self.changed = value != self.value;
        self.value = value;
        // wall clock may step back; the refresh stamp must not
        if now > self.last_refresh {
            self.last_refresh = now;
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn last_refresh(&self) -> DateTime<Utc> {
        self.last_refresh
    }

    /// Seconds since the last refresh
    pub fn age_seconds(&self) -> i64 {
        Utc::now().signed_duration_since(self.last_refresh).num_seconds()
    }
}

impl<T: PartialEq + Default> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Renders just the tracking metadata, e.g. `{lr=1700000000, changed=true}`
impl<T> fmt::Display for ChangeTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{lr={}, changed={}}}",
            self.last_refresh.timestamp(),
            self.changed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_is_unchanged() {
        let tracker = ChangeTracker::new(0.0_f64);
        assert!(!tracker.changed());
        assert_eq!(*tracker.get(), 0.0);
    }

    #[test]
    fn test_set_detects_change() {
        let mut tracker = ChangeTracker::new(1);
        tracker.set(2);
        assert!(tracker.changed());
        assert_eq!(*tracker.get(), 2);

        tracker.set(2);
        assert!(!tracker.changed());
    }

    #[test]
    fn test_refresh_even_when_unchanged() {
        let t0 = Utc::now();
        let mut tracker = ChangeTracker::new_at(5, t0);
        let t1 = t0 + Duration::seconds(3);
        tracker.set_at(5, t1);
        assert!(!tracker.changed());
        assert_eq!(tracker.last_refresh(), t1);
    }

    #[test]
    fn test_refresh_never_goes_backwards() {
        let t0 = Utc::now();
        let mut tracker = ChangeTracker::new_at("a".to_string(), t0);
        tracker.set_at("b".to_string(), t0 - Duration::seconds(10));
        assert!(tracker.changed());
        assert_eq!(tracker.last_refresh(), t0);
    }

    #[test]
    fn test_sequence_equality() {
        let mut tracker = ChangeTracker::new(vec![1, 2, 3]);
        tracker.set(vec![1, 2, 3]);
        assert!(!tracker.changed());
        tracker.set(vec![1, 2]);
        assert!(tracker.changed());
    }

    #[test]
    fn test_display() {
        let tracker = ChangeTracker::new(true);
        let text = tracker.to_string();
        assert!(text.starts_with("{lr="));
        assert!(text.ends_with("changed=false}"));
    }
}
