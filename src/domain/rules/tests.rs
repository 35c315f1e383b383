// Unit tests for domain rules

use crate::domain::model::*;
use crate::domain::rules::*;

#[test]
fn test_valid_interval_has_no_violations() {
    let interval = Interval::from_seconds(3.0, 7.0);
    assert!(IntervalPolicy::violations(&interval, TimeSpec::from_seconds(10.0)).is_empty());
}

#[test]
fn test_interval_ending_at_duration_is_valid() {
    let interval = Interval::from_seconds(3.0, 10.0);
    assert!(IntervalPolicy::violations(&interval, TimeSpec::from_seconds(10.0)).is_empty());
}

#[test]
fn test_interval_past_end() {
    let interval = Interval::from_seconds(3.0, 12.0);
    let violations = IntervalPolicy::violations(&interval, TimeSpec::from_seconds(10.0));
    assert_eq!(
        violations,
        vec![IntervalViolation::PastEnd { end: 12.0, duration: 10.0 }]
    );
}

#[test]
fn test_inverted_and_negative_interval() {
    let interval = Interval::from_seconds(-1.0, -2.0);
    let violations = IntervalPolicy::violations(&interval, TimeSpec::from_seconds(10.0));
    assert_eq!(violations.len(), 2);
    assert!(violations.contains(&IntervalViolation::NegativeStart { start: -1.0 }));
    assert!(violations.contains(&IntervalViolation::EmptyInterval { start: -1.0, end: -2.0 }));
}

#[test]
fn test_violation_messages() {
    let violation = IntervalViolation::PastEnd { end: 12.0, duration: 10.0 };
    assert_eq!(
        violation.to_string(),
        "interval end 12s is beyond source duration 10s"
    );
}

#[test]
fn test_selector_keeps_all_three_for_inner_interval() {
    let plan = Interval::from_seconds(3.0, 7.0).partition(TimeSpec::from_seconds(10.0));
    let kinds: Vec<SegmentKind> = SegmentSelector::extractable(&plan)
        .iter()
        .map(|s| s.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![SegmentKind::Before, SegmentKind::Interval, SegmentKind::After]
    );
}

#[test]
fn test_selector_drops_empty_edges() {
    let plan = Interval::from_seconds(0.0, 10.0).partition(TimeSpec::from_seconds(10.0));
    let kinds: Vec<SegmentKind> = SegmentSelector::extractable(&plan)
        .iter()
        .map(|s| s.kind)
        .collect();
    assert_eq!(kinds, vec![SegmentKind::Interval]);
}

#[test]
fn test_selector_always_keeps_interval() {
    let plan = Interval::from_seconds(5.0, 5.0).partition(TimeSpec::from_seconds(10.0));
    let extractable = SegmentSelector::extractable(&plan);
    assert!(extractable.iter().any(|s| s.kind == SegmentKind::Interval));
    assert_eq!(extractable.len(), 3);
}
