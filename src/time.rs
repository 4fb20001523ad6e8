use std::fmt::{Display, Formatter};
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A point in time, counted in seconds since the start instant of the
/// dataset being scanned.
///
/// The scan and the profiles never need a calendar date: every connection of
/// a feed is timestamped against the same reference instant. `INFINITE` is
/// the "target not reachable" sentinel returned by profile queries.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecondsSinceDatasetStart {
    seconds: i64,
}

impl SecondsSinceDatasetStart {
    pub const INFINITE: Self = Self { seconds: i64::MAX };

    pub fn from_seconds(seconds: i64) -> Self {
        debug_assert!(seconds < i64::MAX);
        Self { seconds }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn is_infinite(&self) -> bool {
        self.seconds == i64::MAX
    }

    /// Projection onto the continuous axis used by the analytics layer.
    pub fn to_f64(self) -> f64 {
        if self.is_infinite() {
            f64::INFINITY
        } else {
            self.seconds as f64
        }
    }

    /// Time elapsed from `earlier` to `self`, as a float so that an
    /// unreachable arrival yields an infinite duration.
    pub fn duration_since(&self, earlier: &Self) -> f64 {
        self.to_f64() - earlier.to_f64()
    }
}

impl Add<PositiveDuration> for SecondsSinceDatasetStart {
    type Output = Self;

    fn add(self, rhs: PositiveDuration) -> Self {
        if self.is_infinite() {
            Self::INFINITE
        } else {
            Self {
                seconds: self.seconds.saturating_add(rhs.seconds as i64),
            }
        }
    }
}

impl Display for SecondsSinceDatasetStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PositiveDuration {
    seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }

    pub fn to_f64(self) -> f64 {
        self.seconds as f64
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_is_absorbing() {
        let inf = SecondsSinceDatasetStart::INFINITE;
        assert!(inf.is_infinite());
        assert!((inf + PositiveDuration::from_hms(1, 0, 0)).is_infinite());
        assert_eq!(inf.to_f64(), f64::INFINITY);
    }

    #[test]
    fn ordering_and_arithmetic() {
        let t = SecondsSinceDatasetStart::from_seconds(100);
        let later = t + PositiveDuration::from_seconds(20);
        assert!(t < later);
        assert!(later < SecondsSinceDatasetStart::INFINITE);
        assert_eq!(later.duration_since(&t), 20.0);
    }
}
