// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! A union of half-open byte ranges, used to turn match coverage into
//! syntax-error spans.

use std::collections::BTreeMap;

/// A set of disjoint, merged `[start, end)` ranges.
#[derive(Clone, Debug, Default)]
pub(crate) struct IntervalUnion {
    ranges: BTreeMap<usize, usize>,
}

impl IntervalUnion {
    pub(crate) fn new() -> IntervalUnion {
        IntervalUnion::default()
    }

    /// Adds `[start, end)`, merging with any overlapping or touching
    /// ranges. Empty ranges are ignored.
    pub(crate) fn add(&mut self, mut start: usize, mut end: usize) {
        if start >= end {
            return;
        }
        let absorbed: Vec<(usize, usize)> = self
            .ranges
            .range(..=end)
            .rev()
            .take_while(|&(_, &e)| e >= start)
            .map(|(&s, &e)| (s, e))
            .collect();
        for (s, e) in absorbed {
            self.ranges.remove(&s);
            start = start.min(s);
            end = end.max(e);
        }
        self.ranges.insert(start, end);
    }

    /// The complement of the union against `[0, len)`, as an ordered map
    /// from span start to span end.
    pub(crate) fn invert(&self, len: usize) -> BTreeMap<usize, usize> {
        let mut gaps = BTreeMap::new();
        let mut cursor = 0;
        for (&start, &end) in &self.ranges {
            if start >= len {
                break;
            }
            if start > cursor {
                gaps.insert(cursor, start);
            }
            cursor = cursor.max(end);
        }
        if cursor < len {
            gaps.insert(cursor, len);
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn merges_overlapping_and_touching() {
        let mut union = IntervalUnion::new();
        union.add(4, 8);
        union.add(0, 2);
        union.add(2, 4);
        union.add(6, 10);
        assert_eq!(union.invert(12), btreemap! { 10 => 12 });
    }

    #[test]
    fn inverts_gaps() {
        let mut union = IntervalUnion::new();
        union.add(0, 4);
        union.add(8, 12);
        assert_eq!(union.invert(12), btreemap! { 4 => 8 });
        assert_eq!(union.invert(14), btreemap! { 4 => 8, 12 => 14 });
    }

    #[test]
    fn empty_union_is_one_gap() {
        let union = IntervalUnion::new();
        assert_eq!(union.invert(3), btreemap! { 0 => 3 });
        assert_eq!(union.invert(0), BTreeMap::new());
    }
}
