use crate::interval::{Interval, IntervalSet};

#[test]
fn add_merges_adjacent_and_overlapping() {
    let mut s = IntervalSet::new();
    s.add_range(10, 20);
    s.add_range(22, 30);
    assert_eq!(s.intervals().len(), 2);

    // 21 bridges the gap.
    s.add(21);
    assert_eq!(s.intervals(), &[Interval::new(10, 30)]);

    s.add_range(5, 12);
    assert_eq!(s.intervals(), &[Interval::new(5, 30)]);
}

#[test]
fn add_range_reports_overlaps() {
    let mut s = IntervalSet::new();
    assert!(s.add_range(10, 20).is_empty());

    // Adjacent, not overlapping: nothing reported.
    assert!(s.add_range(21, 25).is_empty());

    let overlaps = s.add_range(15, 30);
    assert_eq!(overlaps, vec![Interval::new(15, 25)]);
}

#[test]
fn contains_and_bounds() {
    let mut s = IntervalSet::new();
    s.add_range(5, 7);
    s.add(100);
    assert!(s.contains(5));
    assert!(s.contains(6));
    assert!(s.contains(100));
    assert!(!s.contains(8));
    assert!(!s.contains(99));
    assert_eq!(s.min(), Some(5));
    assert_eq!(s.max(), Some(100));
    assert_eq!(s.len(), 4);
}

#[test]
fn intersects_and_intersection() {
    let a = IntervalSet::of_range(10, 20);
    let b = IntervalSet::of_range(18, 25);
    let c = IntervalSet::of_range(30, 40);
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert_eq!(a.intersection(&b).intervals(), &[Interval::new(18, 20)]);
    assert!(a.intersection(&c).is_empty());
}

#[test]
fn union_of_disjoint_sets() {
    let mut a = IntervalSet::of_range(1, 3);
    let b = IntervalSet::of_range(10, 12);
    a.union(&b);
    assert_eq!(
        a.intervals(),
        &[Interval::new(1, 3), Interval::new(10, 12)]
    );
}

#[test]
fn complement_within_universe() {
    let mut s = IntervalSet::new();
    s.add_range(3, 5);
    s.add_range(8, 9);
    let c = s.complement(0, 10);
    assert_eq!(
        c.intervals(),
        &[
            Interval::new(0, 2),
            Interval::new(6, 7),
            Interval::new(10, 10)
        ]
    );

    // Complement of the complement round-trips within the universe.
    let cc = c.complement(0, 10);
    assert_eq!(cc, s);
}

#[test]
fn complement_of_empty_is_universe() {
    let s = IntervalSet::new();
    let c = s.complement(0, 3);
    assert_eq!(c.intervals(), &[Interval::new(0, 3)]);
}

#[test]
fn display_renders_ranges_and_singletons() {
    let mut s = IntervalSet::new();
    s.add_range(97, 122);
    s.add(48);
    assert_eq!(s.to_string(), "{48, 97..122}");
}

#[test]
fn from_iterator_collects() {
    let s: IntervalSet = [3, 1, 2, 7].into_iter().collect();
    assert_eq!(
        s.intervals(),
        &[Interval::new(1, 3), Interval::new(7, 7)]
    );
    let items: Vec<i32> = s.iter().collect();
    assert_eq!(items, vec![1, 2, 3, 7]);
}
