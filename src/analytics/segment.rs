use std::fmt;

use crate::config::segment_bounds::{HIGH_MAX, HIGH_MIN, LOW_MIN, MEDIUM_MIN};

/// Spend tier derived from `Purchase_Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Low,
    Medium,
    High,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Low, Segment::Medium, Segment::High];

    /// Bin a purchase value into `[0,80)`, `[80,150)` or `[150,300)`.
    /// Anything outside `[0,300)`, NaN included, has no segment.
    pub fn from_purchase_value(value: f64) -> Option<Segment> {
        if (LOW_MIN..MEDIUM_MIN).contains(&value) {
            Some(Segment::Low)
        } else if (MEDIUM_MIN..HIGH_MIN).contains(&value) {
            Some(Segment::Medium)
        } else if (HIGH_MIN..HIGH_MAX).contains(&value) {
            Some(Segment::High)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Segment::Low => "Low",
            Segment::Medium => "Medium",
            Segment::High => "High",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bounds_are_inclusive() {
        assert_eq!(Segment::from_purchase_value(0.0), Some(Segment::Low));
        assert_eq!(Segment::from_purchase_value(80.0), Some(Segment::Medium));
        assert_eq!(Segment::from_purchase_value(150.0), Some(Segment::High));
    }

    #[test]
    fn upper_bounds_are_exclusive() {
        assert_eq!(Segment::from_purchase_value(79.99), Some(Segment::Low));
        assert_eq!(Segment::from_purchase_value(149.99), Some(Segment::Medium));
        assert_eq!(Segment::from_purchase_value(299.99), Some(Segment::High));
        assert_eq!(Segment::from_purchase_value(300.0), None);
    }

    #[test]
    fn out_of_range_has_no_segment() {
        assert_eq!(Segment::from_purchase_value(-1.0), None);
        assert_eq!(Segment::from_purchase_value(1_000.0), None);
        assert_eq!(Segment::from_purchase_value(f64::NAN), None);
    }
}
