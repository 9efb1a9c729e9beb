//! Lazy sequence pipeline.
//!
//! A `Pipeline<T>` wraps a pull-based cursor over elements of type `T`.
//! Intermediate stages (filter, map, flat_map, distinct, sorted, limit,
//! skip) return a new pipeline without traversing the source; elements only
//! flow when a terminal operation (for_each, reduce, collect, count, the
//! match family, min/max, find) consumes the pipeline.
//!
//! Every stage and terminal takes `self` by value, so a handle is consumed
//! by exactly one terminal operation — reuse after consumption is rejected
//! at compile time.
//!
//! Sources may be unbounded (`iterate`, `generate`). An unbounded pipeline
//! must be cut down with `limit` before any terminal that exhausts it;
//! short-circuiting terminals (`any_match`, `find_first`, ...) are safe on
//! unbounded pipelines as long as a deciding element exists. Sorting an
//! unbounded pipeline panics immediately rather than hanging.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::io::{self, Write};

use crate::stats::Summary;

/// A chain of deferred transformation stages over a sequence of `T`.
pub struct Pipeline<T> {
    iter: Box<dyn Iterator<Item = T>>,
    bounded: bool,
}

impl<T: 'static> Pipeline<T> {
    /// Build a pipeline from any finite iterator.
    pub fn new<I>(iter: I) -> Pipeline<T>
    where
        I: Iterator<Item = T> + 'static,
    {
        Pipeline {
            iter: Box::new(iter),
            bounded: true,
        }
    }

    /// Build a pipeline backed by a vector, in vector order.
    pub fn from_vec(items: Vec<T>) -> Pipeline<T> {
        Pipeline::new(items.into_iter())
    }

    /// Unbounded deterministic source: `seed`, `successor(&seed)`,
    /// `successor(&successor(&seed))`, ...
    pub fn iterate<F>(seed: T, mut successor: F) -> Pipeline<T>
    where
        F: FnMut(&T) -> T + 'static,
    {
        Pipeline {
            iter: Box::new(std::iter::successors(Some(seed), move |x| {
                Some(successor(x))
            })),
            bounded: false,
        }
    }

    /// Unbounded source drawing each element from a supplier.
    pub fn generate<F>(mut supplier: F) -> Pipeline<T>
    where
        F: FnMut() -> T + 'static,
    {
        Pipeline {
            iter: Box::new(std::iter::from_fn(move || Some(supplier()))),
            bounded: false,
        }
    }

    // -----------------------------------------------------------------
    // Intermediate stages
    // -----------------------------------------------------------------

    /// Keep elements satisfying `predicate`, preserving order.
    pub fn filter<P>(self, predicate: P) -> Pipeline<T>
    where
        P: FnMut(&T) -> bool + 'static,
    {
        Pipeline {
            iter: Box::new(self.iter.filter(predicate)),
            bounded: self.bounded,
        }
    }

    /// One-to-one transform, preserving order and cardinality.
    pub fn map<U, F>(self, transform: F) -> Pipeline<U>
    where
        U: 'static,
        F: FnMut(T) -> U + 'static,
    {
        Pipeline {
            iter: Box::new(self.iter.map(transform)),
            bounded: self.bounded,
        }
    }

    /// One-to-many transform; subsequences are concatenated in source order.
    pub fn flat_map<U, I, F>(self, transform: F) -> Pipeline<U>
    where
        U: 'static,
        I: IntoIterator<Item = U> + 'static,
        I::IntoIter: 'static,
        F: FnMut(T) -> I + 'static,
    {
        Pipeline {
            iter: Box::new(self.iter.flat_map(transform)),
            bounded: self.bounded,
        }
    }

    /// Drop later duplicates per structural equality, keeping the first
    /// occurrence of each element in source order. Lazy: duplicates are
    /// detected as elements are pulled.
    pub fn distinct(self) -> Pipeline<T>
    where
        T: Eq + Hash + Clone,
    {
        let mut seen: HashSet<T> = HashSet::new();
        Pipeline {
            iter: Box::new(self.iter.filter(move |x| seen.insert(x.clone()))),
            bounded: self.bounded,
        }
    }

    /// Stable sort under `comparator`.
    ///
    /// # Panics
    ///
    /// Panics if the pipeline is unbounded: a full sort needs finite input,
    /// so an unbounded source must pass through `limit` first. Failing fast
    /// here beats looping forever.
    pub fn sorted_by<C>(self, comparator: C) -> Pipeline<T>
    where
        C: FnMut(&T, &T) -> Ordering + 'static,
    {
        assert!(
            self.bounded,
            "cannot sort an unbounded pipeline; apply limit() first"
        );
        let mut items: Vec<T> = self.iter.collect();
        items.sort_by(comparator);
        Pipeline::from_vec(items)
    }

    /// Stable sort in natural order.
    ///
    /// # Panics
    ///
    /// Panics on an unbounded pipeline, like [`Pipeline::sorted_by`].
    pub fn sorted(self) -> Pipeline<T>
    where
        T: Ord,
    {
        self.sorted_by(|a, b| a.cmp(b))
    }

    /// Truncate to the first `n` elements. The result is always bounded,
    /// which is the only way to make an unbounded pipeline terminate.
    pub fn limit(self, n: usize) -> Pipeline<T> {
        Pipeline {
            iter: Box::new(self.iter.take(n)),
            bounded: true,
        }
    }

    /// Drop the first `n` elements, passing the rest through unchanged.
    pub fn skip(self, n: usize) -> Pipeline<T> {
        Pipeline {
            iter: Box::new(self.iter.skip(n)),
            bounded: self.bounded,
        }
    }

    // -----------------------------------------------------------------
    // Terminal operations
    // -----------------------------------------------------------------

    /// Apply `action` to each element in encounter order.
    pub fn for_each<F>(self, action: F)
    where
        F: FnMut(T),
    {
        self.iter.for_each(action);
    }

    /// Write each element to `sink`, one `Display` line per element, in
    /// encounter order. The sink is any `io::Write`, so console output and
    /// test-capture buffers are interchangeable.
    pub fn write_to<W: Write>(self, sink: &mut W) -> io::Result<()>
    where
        T: std::fmt::Display,
    {
        for item in self.iter {
            writeln!(sink, "{item}")?;
        }
        Ok(())
    }

    /// True when every element satisfies `predicate`. Short-circuits at the
    /// first failing element; vacuously true on an empty sequence.
    pub fn all_match<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter.all(wrap_ref(predicate))
    }

    /// True when at least one element satisfies `predicate`. Short-circuits
    /// at the first match.
    pub fn any_match<P>(mut self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter.any(wrap_ref(predicate))
    }

    /// True when no element satisfies `predicate`.
    pub fn none_match<P>(self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        !self.any_match(predicate)
    }

    /// First element in encounter order, or `None` on an empty sequence.
    pub fn find_first(mut self) -> Option<T> {
        self.iter.next()
    }

    /// Some element of the sequence, with no ordering guarantee. Under this
    /// sequential evaluation model it returns the same element as
    /// [`Pipeline::find_first`].
    pub fn find_any(self) -> Option<T> {
        self.find_first()
    }

    /// Number of elements surviving the stage chain.
    pub fn count(self) -> usize {
        self.iter.count()
    }

    /// Smallest element under `comparator`, or `None` on an empty sequence.
    /// Ties resolve to the first encountered extremal element.
    pub fn min_by<C>(self, mut comparator: C) -> Option<T>
    where
        C: FnMut(&T, &T) -> Ordering,
    {
        let mut best: Option<T> = None;
        for item in self.iter {
            best = match best {
                Some(b) if comparator(&item, &b) == Ordering::Less => Some(item),
                Some(b) => Some(b),
                None => Some(item),
            };
        }
        best
    }

    /// Largest element under `comparator`, or `None` on an empty sequence.
    /// Ties resolve to the first encountered extremal element.
    pub fn max_by<C>(self, mut comparator: C) -> Option<T>
    where
        C: FnMut(&T, &T) -> Ordering,
    {
        self.min_by(move |a, b| comparator(b, a))
    }

    /// Left fold starting from `identity`. Always returns a value.
    pub fn reduce<F>(self, identity: T, combiner: F) -> T
    where
        F: FnMut(T, T) -> T,
    {
        self.iter.fold(identity, combiner)
    }

    /// Left fold using the first element as the starting value, or `None`
    /// on an empty sequence.
    pub fn reduce_with<F>(mut self, combiner: F) -> Option<T>
    where
        F: FnMut(T, T) -> T,
    {
        let first = self.iter.next()?;
        Some(self.iter.fold(first, combiner))
    }

    /// Collect into an ordered vector.
    pub fn collect(self) -> Vec<T> {
        self.iter.collect()
    }

    /// Collect into a set of unique elements.
    pub fn to_set(self) -> HashSet<T>
    where
        T: Eq + Hash,
    {
        self.iter.collect()
    }

    /// Partition elements into a map from key to ordered group, preserving
    /// within-group source order. Key iteration order is unspecified.
    pub fn group_by<K, F>(self, mut key_fn: F) -> HashMap<K, Vec<T>>
    where
        K: Eq + Hash,
        F: FnMut(&T) -> K,
    {
        let mut groups: HashMap<K, Vec<T>> = HashMap::new();
        for item in self.iter {
            groups.entry(key_fn(&item)).or_default().push(item);
        }
        groups
    }

    /// Two-level grouping: partition by `key_fn`, then partition each group
    /// by `key_fn2`, preserving source order within each leaf group.
    pub fn group_by_nested<K1, K2, F1, F2>(
        self,
        mut key_fn: F1,
        mut key_fn2: F2,
    ) -> HashMap<K1, HashMap<K2, Vec<T>>>
    where
        K1: Eq + Hash,
        K2: Eq + Hash,
        F1: FnMut(&T) -> K1,
        F2: FnMut(&T) -> K2,
    {
        let mut groups: HashMap<K1, HashMap<K2, Vec<T>>> = HashMap::new();
        for item in self.iter {
            groups
                .entry(key_fn(&item))
                .or_default()
                .entry(key_fn2(&item))
                .or_default()
                .push(item);
        }
        groups
    }

    /// Running numeric summary (count, sum, mean, min, max) of a derived
    /// field.
    pub fn summarize<F>(self, mut to_value: F) -> Summary
    where
        F: FnMut(&T) -> f64,
    {
        let mut summary = Summary::new();
        for item in self.iter {
            summary.add(to_value(&item));
        }
        summary
    }
}

/// Adapt a `FnMut(&T) -> bool` to the by-value signature `Iterator::all`
/// and `Iterator::any` expect.
fn wrap_ref<T, P: FnMut(&T) -> bool>(mut predicate: P) -> impl FnMut(T) -> bool {
    move |item| predicate(&item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Employee, Status};

    fn staff() -> Vec<Employee> {
        vec![
            Employee::new("ALICE", 35, 5000.55, Status::Busy),
            Employee::new("BARB", 23, 6600.55, Status::Idle),
            Employee::new("CHUCK", 25, 5600.55, Status::Busy),
            Employee::new("DORA", 50, 3211.23, Status::OnLeave),
            Employee::new("DORA", 50, 3211.23, Status::OnLeave),
            Employee::new("EARL", 55, 9211.23, Status::Idle),
            Employee::new("FAYE", 38, 5854.55, Status::Busy),
            Employee::new("HENRY", 23, 9000.0, Status::Idle),
            Employee::new("HENRY", 23, 9000.0, Status::Idle),
        ]
    }

    #[test]
    fn test_filter_count_matches_manual_count() {
        let source = staff();
        let expected = source.iter().filter(|e| e.salary() > 6000.0).count();
        let got = Pipeline::from_vec(source)
            .filter(|e| e.salary() > 6000.0)
            .count();
        assert_eq!(got, expected);
        assert_eq!(got, 4);
    }

    #[test]
    fn test_filter_preserves_order() {
        let names: Vec<String> = Pipeline::from_vec(staff())
            .filter(|e| e.salary() > 6000.0)
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["BARB", "EARL", "HENRY", "HENRY"]);
    }

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let names: Vec<String> = Pipeline::from_vec(staff())
            .distinct()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["ALICE", "BARB", "CHUCK", "DORA", "EARL", "FAYE", "HENRY"]
        );
    }

    #[test]
    fn test_distinct_is_idempotent() {
        let once: Vec<Employee> = Pipeline::from_vec(staff()).distinct().collect();
        let twice: Vec<Employee> = Pipeline::from_vec(staff()).distinct().distinct().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_limit_count_is_min() {
        assert_eq!(Pipeline::from_vec(staff()).limit(4).count(), 4);
        assert_eq!(Pipeline::from_vec(staff()).limit(100).count(), 9);
        assert_eq!(Pipeline::from_vec(staff()).limit(0).count(), 0);
    }

    #[test]
    fn test_limit_zero_on_nonempty_is_empty_not_error() {
        let out: Vec<Employee> = Pipeline::from_vec(staff()).limit(0).collect();
        assert!(out.is_empty());
    }

    #[test]
    fn test_skip_limit_windowing_consistency() {
        // skip(n).limit(m) == limit(n+m) then drop the first n
        let n = 2;
        let m = 3;
        let direct: Vec<Employee> = Pipeline::from_vec(staff()).skip(n).limit(m).collect();
        let via_limit: Vec<Employee> = Pipeline::from_vec(staff()).limit(n + m).skip(n).collect();
        assert_eq!(direct, via_limit);
        assert_eq!(direct.len(), m);
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        assert_eq!(Pipeline::from_vec(staff()).skip(50).count(), 0);
    }

    #[test]
    fn test_sort_is_stable_with_tie_break() {
        // Age ascending, name breaks ties; equal ages keep name order,
        // never original position when names differ.
        let sorted: Vec<Employee> = Pipeline::from_vec(staff())
            .distinct()
            .sorted_by(|a, b| a.age().cmp(&b.age()).then_with(|| a.name().cmp(b.name())))
            .collect();
        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["BARB", "HENRY", "CHUCK", "ALICE", "FAYE", "DORA", "EARL"]
        );
    }

    #[test]
    fn test_sort_stability_for_full_ties() {
        // Same age, same name, different salary; comparator sees them as
        // equal so source order must survive.
        let twins = vec![
            Employee::new("IVY", 30, 2.0, Status::Busy),
            Employee::new("IVY", 30, 1.0, Status::Busy),
        ];
        let sorted: Vec<Employee> = Pipeline::from_vec(twins)
            .sorted_by(|a, b| a.age().cmp(&b.age()).then_with(|| a.name().cmp(b.name())))
            .collect();
        assert_eq!(sorted[0].salary(), 2.0);
        assert_eq!(sorted[1].salary(), 1.0);
    }

    #[test]
    fn test_sorted_natural_order() {
        let out: Vec<i64> = Pipeline::from_vec(vec![3, 1, 2]).sorted().collect();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "cannot sort an unbounded pipeline")]
    fn test_sort_unbounded_fails_fast() {
        let _ = Pipeline::iterate(0, |x| x + 1).sorted_by(|a, b| a.cmp(b));
    }

    #[test]
    fn test_sort_after_limit_on_unbounded_is_allowed() {
        let out: Vec<i64> = Pipeline::iterate(5, |x| x - 1)
            .limit(3)
            .sorted_by(|a, b| a.cmp(b))
            .collect();
        assert_eq!(out, vec![3, 4, 5]);
    }

    #[test]
    fn test_map_preserves_cardinality() {
        let names: Vec<String> = Pipeline::from_vec(staff())
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_flat_map_concatenates_in_order() {
        let words = vec!["ab".to_string(), "cd".to_string()];
        let chars: Vec<char> = Pipeline::from_vec(words)
            .flat_map(|s| s.chars().collect::<Vec<char>>())
            .collect();
        assert_eq!(chars, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_iterate_with_limit() {
        let evens: Vec<i64> = Pipeline::iterate(0, |x| x + 2).limit(5).collect();
        assert_eq!(evens, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_generate_with_limit() {
        let mut n = 0;
        let out: Vec<i64> = Pipeline::generate(move || {
            n += 1;
            n
        })
        .limit(3)
        .collect();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_any_match_short_circuits_on_unbounded() {
        // Terminates only because the terminal stops at the first match.
        assert!(Pipeline::iterate(0, |x| x + 1).any_match(|&x| x > 10));
    }

    #[test]
    fn test_all_match_short_circuits_on_unbounded() {
        assert!(!Pipeline::iterate(0, |x| x + 1).all_match(|&x| x < 5));
    }

    #[test]
    fn test_match_family() {
        assert!(!Pipeline::from_vec(staff()).all_match(|e| e.status() == Status::Busy));
        assert!(Pipeline::from_vec(staff()).any_match(|e| e.status() == Status::Busy));
        assert!(!Pipeline::from_vec(staff()).none_match(|e| e.status() == Status::Busy));
        assert!(Pipeline::from_vec(staff()).none_match(|e| e.age() > 90));
    }

    #[test]
    fn test_all_match_vacuous_on_empty() {
        let empty: Vec<Employee> = vec![];
        assert!(Pipeline::from_vec(empty).all_match(|_| false));
    }

    #[test]
    fn test_find_first_in_encounter_order() {
        let first = Pipeline::from_vec(staff())
            .filter(|e| e.salary() > 5000.0)
            .find_first()
            .unwrap();
        assert_eq!(first.name(), "ALICE");
    }

    #[test]
    fn test_find_any_equals_find_first_sequentially() {
        let first = Pipeline::from_vec(staff())
            .filter(|e| e.salary() > 5000.0)
            .find_first();
        let any = Pipeline::from_vec(staff())
            .filter(|e| e.salary() > 5000.0)
            .find_any();
        assert_eq!(first, any);
    }

    #[test]
    fn test_find_first_on_unbounded_terminates() {
        let hit = Pipeline::iterate(1, |x| x * 2)
            .filter(|&x| x > 100)
            .find_first();
        assert_eq!(hit, Some(128));
    }

    #[test]
    fn test_find_first_empty_is_none() {
        let none = Pipeline::from_vec(staff())
            .filter(|e| e.age() > 90)
            .find_first();
        assert!(none.is_none());
    }

    #[test]
    fn test_max_min_by_salary() {
        let max = Pipeline::from_vec(staff())
            .max_by(|a, b| a.salary().partial_cmp(&b.salary()).unwrap())
            .unwrap();
        assert_eq!(max.name(), "EARL");
        let min = Pipeline::from_vec(staff())
            .min_by(|a, b| a.salary().partial_cmp(&b.salary()).unwrap())
            .unwrap();
        assert_eq!(min.name(), "DORA");
    }

    #[test]
    fn test_max_tie_resolves_to_first_encountered() {
        let pair = vec![
            Employee::new("LEFT", 40, 7000.0, Status::Busy),
            Employee::new("RIGHT", 41, 7000.0, Status::Idle),
        ];
        let max = Pipeline::from_vec(pair)
            .max_by(|a, b| a.salary().partial_cmp(&b.salary()).unwrap())
            .unwrap();
        assert_eq!(max.name(), "LEFT");
    }

    #[test]
    fn test_min_tie_resolves_to_first_encountered() {
        let pair = vec![
            Employee::new("LEFT", 40, 7000.0, Status::Busy),
            Employee::new("RIGHT", 41, 7000.0, Status::Idle),
        ];
        let min = Pipeline::from_vec(pair)
            .min_by(|a, b| a.salary().partial_cmp(&b.salary()).unwrap())
            .unwrap();
        assert_eq!(min.name(), "LEFT");
    }

    #[test]
    fn test_min_max_empty_is_none() {
        let empty: Vec<Employee> = vec![];
        assert!(Pipeline::from_vec(empty).min_by(|a, b| a.age().cmp(&b.age())).is_none());
    }

    #[test]
    fn test_reduce_with_identity() {
        let total = Pipeline::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).reduce(0, |x, y| x + y);
        assert_eq!(total, 55);
    }

    #[test]
    fn test_reduce_with_identity_on_empty_returns_identity() {
        let empty: Vec<i64> = vec![];
        assert_eq!(Pipeline::from_vec(empty).reduce(0, |x, y| x + y), 0);
    }

    #[test]
    fn test_reduce_without_identity() {
        let total = Pipeline::from_vec(staff())
            .map(|e| e.salary())
            .reduce_with(|x, y| x + y)
            .unwrap();
        let expected: f64 = staff().iter().map(|e| e.salary()).sum();
        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_without_identity_empty_is_none() {
        let none = Pipeline::from_vec(staff())
            .filter(|e| e.age() > 90)
            .map(|e| e.salary())
            .reduce_with(|x, y| x + y);
        assert!(none.is_none());
    }

    #[test]
    fn test_concrete_salary_scenario() {
        // Three records; filter salary > 5000 keeps A and B in order and
        // their salaries sum to 11601.10.
        let small = vec![
            Employee::new("A", 35, 5000.55, Status::Busy),
            Employee::new("B", 23, 6600.55, Status::Idle),
            Employee::new("C", 50, 3211.23, Status::OnLeave),
        ];
        let kept: Vec<Employee> = Pipeline::from_vec(small.clone())
            .filter(|e| e.salary() > 5000.0)
            .collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name(), "A");
        assert_eq!(kept[1].name(), "B");

        let sum = Pipeline::from_vec(small)
            .filter(|e| e.salary() > 5000.0)
            .map(|e| e.salary())
            .reduce(0.0, |x, y| x + y);
        assert!((sum - 11601.10).abs() < 1e-9);
    }

    #[test]
    fn test_to_set_dedupes() {
        let set = Pipeline::from_vec(staff()).to_set();
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn test_group_by_status_preserves_group_order() {
        let groups = Pipeline::from_vec(staff()).distinct().group_by(|e| e.status());
        assert_eq!(groups.len(), 3);
        let busy: Vec<&str> = groups[&Status::Busy].iter().map(|e| e.name()).collect();
        assert_eq!(busy, vec!["ALICE", "CHUCK", "FAYE"]);
        let idle: Vec<&str> = groups[&Status::Idle].iter().map(|e| e.name()).collect();
        assert_eq!(idle, vec!["BARB", "EARL", "HENRY"]);
        assert_eq!(groups[&Status::OnLeave].len(), 1);
    }

    #[test]
    fn test_group_by_flatten_reproduces_input() {
        let input: Vec<Employee> = Pipeline::from_vec(staff()).distinct().collect();
        let groups = Pipeline::from_vec(input.clone()).group_by(|e| e.status());
        let mut flattened: Vec<Employee> = groups.into_values().flatten().collect();
        let mut expected = input;
        let key = |e: &Employee| (e.name().to_string(), e.age());
        flattened.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_group_by_nested() {
        let groups = Pipeline::from_vec(staff())
            .distinct()
            .group_by_nested(|e| e.status(), |e| e.age_band());
        let idle = &groups[&Status::Idle];
        // BARB (23) and HENRY (23) are young, EARL (55) is senior.
        assert_eq!(idle[&crate::record::AgeBand::Young].len(), 2);
        assert_eq!(idle[&crate::record::AgeBand::Senior].len(), 1);
        let busy = &groups[&Status::Busy];
        assert_eq!(busy[&crate::record::AgeBand::Middle].len(), 2);
        assert_eq!(busy[&crate::record::AgeBand::Young].len(), 1);
    }

    #[test]
    fn test_summarize_salaries() {
        let summary = Pipeline::from_vec(staff()).distinct().summarize(|e| e.salary());
        assert_eq!(summary.count(), 7);
        assert_eq!(summary.min(), 3211.23);
        assert_eq!(summary.max(), 9211.23);
        let expected_sum: f64 = Pipeline::from_vec(staff())
            .distinct()
            .map(|e| e.salary())
            .reduce(0.0, |x, y| x + y);
        assert!((summary.sum() - expected_sum).abs() < 1e-9);
        assert!((summary.mean() - expected_sum / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_write_to_sink() {
        let mut buf: Vec<u8> = Vec::new();
        Pipeline::from_vec(staff())
            .filter(|e| e.status() == Status::OnLeave)
            .distinct()
            .write_to(&mut buf)
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "DORA 50 3211.23 ON_LEAVE\n");
    }

    #[test]
    fn test_for_each_in_order() {
        let mut seen: Vec<String> = Vec::new();
        Pipeline::from_vec(staff())
            .limit(3)
            .for_each(|e| seen.push(e.name().to_string()));
        assert_eq!(seen, vec!["ALICE", "BARB", "CHUCK"]);
    }

    #[test]
    fn test_same_definition_same_result() {
        let run = || -> Vec<String> {
            Pipeline::from_vec(staff())
                .filter(|e| e.age() < 40)
                .map(|e| e.name().to_string())
                .collect()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_stages_are_lazy_until_terminal() {
        // The transform must not run while only intermediate stages are
        // chained; the terminal pulls everything.
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let pipeline = Pipeline::from_vec(vec![1, 2, 3]).map(move |x| {
            counter.set(counter.get() + 1);
            x * 10
        });
        assert_eq!(calls.get(), 0);
        let out: Vec<i64> = pipeline.collect();
        assert_eq!(out, vec![10, 20, 30]);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_limit_pulls_no_more_than_needed() {
        use std::cell::Cell;
        use std::rc::Rc;

        let pulls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&pulls);
        let out: Vec<i64> = Pipeline::generate(move || {
            counter.set(counter.get() + 1);
            7
        })
        .limit(4)
        .collect();
        assert_eq!(out.len(), 4);
        assert_eq!(pulls.get(), 4);
    }
}
