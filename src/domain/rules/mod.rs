// Domain rules - Interval policy and segment selection

use std::fmt;

use crate::domain::model::*;

/// Tolerance (seconds) allowed between final and source durations before a warning
pub const DURATION_DRIFT_TOLERANCE: f64 = 0.1;

/// A violation of `0 <= start < end <= duration`
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalViolation {
    NegativeStart { start: f64 },
    EmptyInterval { start: f64, end: f64 },
    PastEnd { end: f64, duration: f64 },
}

impl fmt::Display for IntervalViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalViolation::NegativeStart { start } => {
                write!(f, "interval start {}s is negative", start)
            }
            IntervalViolation::EmptyInterval { start, end } => {
                write!(f, "interval end {}s is not after start {}s", end, start)
            }
            IntervalViolation::PastEnd { end, duration } => {
                write!(f, "interval end {}s is beyond source duration {}s", end, duration)
            }
        }
    }
}

/// Checks on interval bounds.
///
/// Violations are reported, never enforced: the pipeline hands the bounds to
/// the media tool as given and lets it decide.
pub struct IntervalPolicy;

impl IntervalPolicy {
    /// List every violated bound for a source of `duration` seconds
    pub fn violations(interval: &Interval, duration: TimeSpec) -> Vec<IntervalViolation> {
        let start = interval.start.seconds;
        let end = interval.end.seconds;
        let mut violations = Vec::new();

        if start < 0.0 {
            violations.push(IntervalViolation::NegativeStart { start });
        }
        if end <= start {
            violations.push(IntervalViolation::EmptyInterval { start, end });
        }
        if end > duration.seconds {
            violations.push(IntervalViolation::PastEnd {
                end,
                duration: duration.seconds,
            });
        }

        violations
    }
}

/// Which planned segments get extracted
pub struct SegmentSelector;

impl SegmentSelector {
    /// Segments to extract, in order.
    ///
    /// The edit interval is always extracted. Before/after are skipped when
    /// they have no positive length; the stitcher treats them as absent.
    pub fn extractable(plan: &SegmentPlan) -> Vec<SegmentBounds> {
        plan.segments()
            .into_iter()
            .filter(|segment| segment.kind == SegmentKind::Interval || !segment.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests;
