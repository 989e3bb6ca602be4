//! Set algebra over sorted id sequences.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ids of two keyed collections, split into three disjoint groups.
///
/// Every group is in ascending id order.
#[derive(Debug)]
pub(crate) struct IdPartition<'a, K> {
    /// In `a` but not in `b`.
    pub only_a: Vec<&'a K>,
    /// In `b` but not in `a`.
    pub only_b: Vec<&'a K>,
    /// In both.
    pub both: Vec<&'a K>,
}

/// Merge-walk the two sorted key sequences.
///
/// Runs in `O(|a| + |b|)` and does not depend on any hash iteration order.
pub(crate) fn partition<'a, K: Ord, A, B>(
    a: &'a BTreeMap<K, A>,
    b: &'a BTreeMap<K, B>,
) -> IdPartition<'a, K> {
    let mut out = IdPartition {
        only_a: Vec::new(),
        only_b: Vec::new(),
        both: Vec::new(),
    };

    let mut left = a.keys().peekable();
    let mut right = b.keys().peekable();

    loop {
        match (left.peek(), right.peek()) {
            (Some(x), Some(y)) => match x.cmp(y) {
                Ordering::Less => out.only_a.extend(left.next()),
                Ordering::Greater => out.only_b.extend(right.next()),
                Ordering::Equal => {
                    out.both.extend(left.next());
                    right.next();
                }
            },
            (Some(_), None) => out.only_a.extend(left.next()),
            (None, Some(_)) => out.only_b.extend(right.next()),
            (None, None) => break,
        }
    }

    out
}
