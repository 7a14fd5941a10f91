// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The memo table: the mapping from (clause, start position) to the best
//! known match, and the queries on it that drive error reporting and
//! recovery.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::clause::{ClauseBody, ClauseId};
use crate::error::Error;
use crate::grammar::Grammar;
use crate::intervals::IntervalUnion;
use crate::parser;

/// A memo table key: a clause at a start position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MemoKey {
    /// The clause being matched.
    pub clause: ClauseId,
    /// The byte offset the match starts at.
    pub start: usize,
}

impl Ord for MemoKey {
    fn cmp(&self, other: &MemoKey) -> Ordering {
        (self.start, self.clause).cmp(&(other.start, other.clause))
    }
}

impl PartialOrd for MemoKey {
    fn partial_cmp(&self, other: &MemoKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A match of a clause at a position.
///
/// Matches are immutable and shared: the same sub-match may appear under
/// many parents, and an improved parent match snapshots whatever its
/// children were at the time it was built.
#[derive(Clone, Debug)]
pub struct Match {
    key: MemoKey,
    len: usize,
    first_matching_sub_clause: usize,
    sub_matches: Vec<Rc<Match>>,
}

impl Match {
    pub(crate) fn new(
        key: MemoKey,
        first_matching_sub_clause: usize,
        len: usize,
        sub_matches: Vec<Rc<Match>>,
    ) -> Match {
        Match {
            key,
            len,
            first_matching_sub_clause,
            sub_matches,
        }
    }

    pub(crate) fn terminal(key: MemoKey, len: usize) -> Match {
        Match::new(key, 0, len, vec![])
    }

    /// Synthesized for a clause that can match zero characters but was
    /// never driven to an actual match at this position.
    pub(crate) fn zero_width(key: MemoKey) -> Match {
        Match::terminal(key, 0)
    }

    /// The key this match is stored under.
    pub fn key(&self) -> MemoKey {
        self.key
    }

    /// The clause this match is of.
    pub fn clause(&self) -> ClauseId {
        self.key.clause
    }

    /// The byte offset the match starts at.
    pub fn start(&self) -> usize {
        self.key.start
    }

    /// The number of bytes of input the match consumed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the match consumed no input.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte offset just past the match.
    pub fn end(&self) -> usize {
        self.key.start + self.len
    }

    /// The index of the first matching sub-clause. Only meaningful for
    /// `First` and `Longest` clauses; `0` otherwise.
    pub fn first_matching_sub_clause(&self) -> usize {
        self.first_matching_sub_clause
    }

    /// The child matches, in order. Empty for terminals; a `[head]` or
    /// `[head, tail]` pair for the right-recursive `OneOrMore` spine.
    pub fn sub_matches(&self) -> &[Rc<Match>] {
        &self.sub_matches
    }

    /// Whether this match supersedes `other` under the same key: longer
    /// wins, and at equal length the lower ordered-choice index wins.
    pub(crate) fn is_better_than(&self, other: &Match) -> bool {
        self.len > other.len
            || (self.len == other.len
                && self.first_matching_sub_clause < other.first_matching_sub_clause)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clause {} at {}+{}",
            self.key.clause, self.key.start, self.len
        )
    }
}

/// The result of one parse: per clause, the best match at every start
/// position it matched at, plus the positions it was queried at without
/// matching.
///
/// A memo table borrows its grammar and input for its whole lifetime and
/// is exclusively owned by the parse that filled it.
pub struct MemoTable<'g, 'i> {
    grammar: &'g Grammar,
    input: &'i str,
    matches: Vec<BTreeMap<usize, Rc<Match>>>,
    non_matches: Vec<BTreeSet<usize>>,
}

impl<'g, 'i> MemoTable<'g, 'i> {
    pub(crate) fn new(grammar: &'g Grammar, input: &'i str) -> MemoTable<'g, 'i> {
        let num_clauses = grammar.clauses().len();
        MemoTable {
            grammar,
            input,
            matches: vec![BTreeMap::new(); num_clauses],
            non_matches: vec![BTreeSet::new(); num_clauses],
        }
    }

    /// The input this table was parsed from.
    pub fn input(&self) -> &'i str {
        self.input
    }

    /// The grammar this table was parsed with.
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The memoized best match for `key`, if any.
    pub fn best_match(&self, key: MemoKey) -> Option<Rc<Match>> {
        self.matches[key.clause.index()].get(&key.start).cloned()
    }

    /// The best known match for `key`, the way a parent clause sees it:
    /// a memoized entry if present; otherwise terminals and negative
    /// lookaheads are computed on demand from the input (and not cached);
    /// otherwise a clause that can match zero characters yields a
    /// synthesized zero-length match. A miss is recorded in the queried
    /// clause's non-match index.
    pub(crate) fn look_up_best_match(&mut self, key: MemoKey) -> Option<Rc<Match>> {
        if let Some(found) = self.matches[key.clause.index()].get(&key.start) {
            return Some(Rc::clone(found));
        }
        let grammar = self.grammar;
        let clause = grammar.clause(key.clause);
        let computed = if clause.is_terminal()
            || matches!(clause.body(), ClauseBody::NotFollowedBy(_))
        {
            parser::match_bottom_up(grammar, self, key).map(Rc::new)
        } else if clause.can_match_zero() {
            Some(Rc::new(Match::zero_width(key)))
        } else {
            None
        };
        if computed.is_none() {
            self.non_matches[key.clause.index()].insert(key.start);
        }
        computed
    }

    /// Inserts `m` if it is new or better than the current entry for its
    /// key; returns whether the table changed.
    pub(crate) fn insert_best_match(&mut self, m: Match) -> bool {
        self.insert_best_match_rc(Rc::new(m))
    }

    pub(crate) fn insert_best_match_rc(&mut self, m: Rc<Match>) -> bool {
        use std::collections::btree_map::Entry;

        let key = m.key();
        debug_assert!(key.start + m.len() <= self.input.len());
        match self.matches[key.clause.index()].entry(key.start) {
            Entry::Vacant(entry) => {
                entry.insert(m);
                true
            }
            Entry::Occupied(mut entry) => {
                if m.is_better_than(entry.get()) {
                    entry.insert(m);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// All matches of `clause`, walked greedily left to right: the match
    /// at the smallest start position at or past the cursor is taken and
    /// the cursor advances past it (always by at least one, so zero-width
    /// matches cannot stall the walk).
    pub fn non_overlapping_matches(&self, clause: ClauseId) -> Vec<Rc<Match>> {
        let per_start = &self.matches[clause.index()];
        let mut result = vec![];
        let mut cursor = 0;
        while let Some((&start, m)) = per_start.range(cursor..).next() {
            result.push(Rc::clone(m));
            cursor = start + m.len().max(1);
        }
        result
    }

    /// The ordered index of `clause`'s matches, keyed by start position.
    /// Supports ceiling/floor walks for recovery.
    pub fn navigable_matches(&self, clause: ClauseId) -> &BTreeMap<usize, Rc<Match>> {
        &self.matches[clause.index()]
    }

    /// The positions at which `clause` was queried during parsing but had
    /// no match. Positions the parse never touched are neither matches
    /// nor recorded non-matches.
    pub fn non_match_positions(&self, clause: ClauseId) -> impl Iterator<Item = usize> + '_ {
        self.non_matches[clause.index()].iter().copied()
    }

    /// [`Self::non_overlapping_matches`] for a rule name; the bare name of
    /// a precedence-tiered rule resolves to its lowest level.
    pub fn non_overlapping_matches_for_rule(&self, name: &str) -> Result<Vec<Rc<Match>>, Error> {
        Ok(self.non_overlapping_matches(self.grammar.rule_clause(name)?))
    }

    /// [`Self::navigable_matches`] for a rule name.
    pub fn navigable_matches_for_rule(
        &self,
        name: &str,
    ) -> Result<&BTreeMap<usize, Rc<Match>>, Error> {
        Ok(self.navigable_matches(self.grammar.rule_clause(name)?))
    }

    /// [`Self::non_match_positions`] for a rule name.
    pub fn non_match_positions_for_rule(&self, name: &str) -> Result<Vec<usize>, Error> {
        Ok(self
            .non_match_positions(self.grammar.rule_clause(name)?)
            .collect())
    }

    /// The spans of input not covered by any non-overlapping match of the
    /// named rules, as an ordered map from span start to (span end, span
    /// text). An empty map means the named rules tile the whole input.
    pub fn syntax_errors(
        &self,
        rule_names: &[&str],
    ) -> Result<BTreeMap<usize, (usize, &'i str)>, Error> {
        let mut covered = IntervalUnion::new();
        for name in rule_names {
            for m in self.non_overlapping_matches_for_rule(name)? {
                if !m.is_empty() {
                    covered.add(m.start(), m.end());
                }
            }
        }
        Ok(covered
            .invert(self.input.len())
            .into_iter()
            .map(|(start, end)| (start, (end, &self.input[start..end])))
            .collect())
    }

    /// The slice of input a match covers.
    pub fn match_text(&self, m: &Match) -> &'i str {
        &self.input[m.start()..m.end()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{lit, rule};

    fn sample() -> Grammar {
        Grammar::compile(vec![rule("A", lit("a"))]).unwrap()
    }

    #[test]
    fn memo_key_order() {
        let a = MemoKey {
            clause: ClauseId::new(3),
            start: 1,
        };
        let b = MemoKey {
            clause: ClauseId::new(0),
            start: 2,
        };
        assert!(a < b, "start position dominates the clause tiebreak");
    }

    #[test]
    fn insert_keeps_best() {
        let grammar = sample();
        let mut table = MemoTable::new(&grammar, "aaaa");
        let key = MemoKey {
            clause: grammar.rule_clause("A").unwrap(),
            start: 0,
        };

        assert!(table.insert_best_match(Match::new(key, 1, 1, vec![])));
        // Shorter match is a no-op.
        assert!(!table.insert_best_match(Match::new(key, 0, 0, vec![])));
        // Longer match replaces.
        assert!(table.insert_best_match(Match::new(key, 1, 2, vec![])));
        // Same length, lower ordered-choice index replaces.
        assert!(table.insert_best_match(Match::new(key, 0, 2, vec![])));
        // Same again is a no-op.
        assert!(!table.insert_best_match(Match::new(key, 0, 2, vec![])));

        let best = table.best_match(key).unwrap();
        assert_eq!(best.len(), 2);
        assert_eq!(best.first_matching_sub_clause(), 0);
    }

    #[test]
    fn non_overlapping_walk_makes_progress() {
        let grammar = sample();
        let mut table = MemoTable::new(&grammar, "aaaa");
        let clause = grammar.rule_clause("A").unwrap();
        for start in 0..4 {
            // Zero-width matches at every position must not stall the walk.
            table.insert_best_match(Match::new(MemoKey { clause, start }, 0, 0, vec![]));
        }
        let walked = table.non_overlapping_matches(clause);
        assert_eq!(walked.len(), 4);
        assert_eq!(
            walked.iter().map(|m| m.start()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }
}
