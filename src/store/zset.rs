//! Sorted set value
//!
//! Members are unique; iteration order is by score, then by member bytes.

use bytes::Bytes;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

/// A score with a total order, so it can key a `BTreeSet`
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSet {
    scores: HashMap<Bytes, f64>,
    ordered: BTreeSet<(Score, Bytes)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Add or update a member, returns true if it was not there before
    pub fn insert(&mut self, member: Bytes, score: f64) -> bool {
        let previous = self.scores.insert(member.clone(), score);
        if let Some(old) = previous {
            self.ordered.remove(&(Score(old), member.clone()));
        }
        self.ordered.insert((Score(score), member));
        previous.is_none()
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.scores.remove_entry(member) {
            Some((member, score)) => {
                self.ordered.remove(&(Score(score), member));
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Add `delta` to a member's score, creating it at `delta`
    ///
    /// A NaN result leaves the set untouched and returns None.
    pub fn incr(&mut self, member: Bytes, delta: f64) -> Option<f64> {
        let score = self.score(&member).unwrap_or(0.0) + delta;
        if score.is_nan() {
            return None;
        }
        self.insert(member, score);
        Some(score)
    }

    /// Zero-based position in ascending order
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = self.score(member)?;
        let key = (Score(score), Bytes::copy_from_slice(member));
        Some(self.ordered.range(..key).count())
    }

    /// Members in ascending order with their scores
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Bytes, f64)> + '_ {
        self.ordered.iter().map(|(score, member)| (member, score.0))
    }

    /// Members whose score lies within `min..max`, ascending
    pub fn range_by_score(
        &self,
        min: Bound<f64>,
        max: Bound<f64>,
    ) -> impl DoubleEndedIterator<Item = (&Bytes, f64)> + '_ {
        self.iter()
            .filter(move |(_, score)| above(min, *score) && below(max, *score))
    }

    pub fn count(&self, min: Bound<f64>, max: Bound<f64>) -> usize {
        self.range_by_score(min, max).count()
    }
}

fn above(min: Bound<f64>, score: f64) -> bool {
    match min {
        Bound::Included(m) => score >= m,
        Bound::Excluded(m) => score > m,
        Bound::Unbounded => true,
    }
}

fn below(max: Bound<f64>, score: f64) -> bool {
    match max {
        Bound::Included(m) => score <= m,
        Bound::Excluded(m) => score < m,
        Bound::Unbounded => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SortedSet {
        let mut z = SortedSet::new();
        z.insert(Bytes::from("b"), 2.0);
        z.insert(Bytes::from("a"), 1.0);
        z.insert(Bytes::from("c"), 2.0);
        z
    }

    #[test]
    fn test_order_by_score_then_member() {
        let z = sample();
        let members: Vec<_> = z.iter().map(|(m, _)| m.clone()).collect();
        assert_eq!(members, vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
    }

    #[test]
    fn test_update_moves_member() {
        let mut z = sample();
        assert!(!z.insert(Bytes::from("a"), 5.0));
        assert_eq!(z.len(), 3);
        assert_eq!(z.rank(b"a"), Some(2));
        assert_eq!(z.rank(b"b"), Some(0));
    }

    #[test]
    fn test_incr_and_remove() {
        let mut z = sample();
        assert_eq!(z.incr(Bytes::from("a"), 0.5), Some(1.5));
        assert_eq!(z.incr(Bytes::from("new"), 3.0), Some(3.0));

        z.insert(Bytes::from("top"), f64::INFINITY);
        assert_eq!(z.incr(Bytes::from("top"), f64::NEG_INFINITY), None);
        assert_eq!(z.score(b"top"), Some(f64::INFINITY));
        assert!(z.remove(b"b"));
        assert!(!z.remove(b"b"));
        assert_eq!(z.score(b"b"), None);
        assert_eq!(z.len(), 3);
    }

    #[test]
    fn test_range_by_score_bounds() {
        let z = sample();
        assert_eq!(z.count(Bound::Included(2.0), Bound::Unbounded), 2);
        assert_eq!(z.count(Bound::Excluded(1.0), Bound::Excluded(2.0)), 0);
        assert_eq!(z.count(Bound::Unbounded, Bound::Included(1.0)), 1);
        let rev: Vec<_> = z
            .range_by_score(Bound::Unbounded, Bound::Unbounded)
            .rev()
            .map(|(m, _)| m.clone())
            .collect();
        assert_eq!(rev[0], Bytes::from("c"));
    }
}
