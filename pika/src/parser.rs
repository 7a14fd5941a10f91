// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The parser driver: right-to-left seeding from terminals, with matches
//! propagated bottom-up through seed-parent links until each position
//! reaches a fixpoint.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::clause::{ClauseBody, ClauseId};
use crate::grammar::Grammar;
use crate::memo::{Match, MemoKey, MemoTable};

/// Parses `input` and returns the filled memo table.
///
/// Parsing never fails: the absence of a top-rule match spanning the whole
/// input is data, reported through the memo table's queries.
pub fn parse<'g, 'i>(grammar: &'g Grammar, input: &'i str) -> MemoTable<'g, 'i> {
    let mut memo = MemoTable::new(grammar, input);
    let mut active: BTreeSet<ClauseId> = BTreeSet::new();

    // Walking right to left means every position to the right of the
    // current one is already fully resolved, so parent clauses can be
    // evaluated from the memo table alone, without recursion.
    let starts: Vec<usize> = input.char_indices().map(|(i, _)| i).rev().collect();
    for start in starts {
        match grammar.lex_clause() {
            Some(lex) => {
                // Lex mode: match the lex clause top-down, which keeps the
                // purely lexical terminals out of the memo table.
                match_top_down(
                    grammar,
                    &mut memo,
                    MemoKey { clause: lex, start },
                    &mut active,
                );
            }
            None => {
                active.extend(grammar.terminal_seeds().iter().copied());
            }
        }

        // Fixpoint: the active set drains in ascending clause-id order,
        // which is bottom-up topological order, so children settle before
        // the parents they would reactivate.
        while let Some(clause) = active.pop_first() {
            let key = MemoKey { clause, start };
            if let Some(found) = match_bottom_up(grammar, &mut memo, key) {
                if memo.insert_best_match(found) {
                    active.extend(grammar.clause(clause).seed_parents().iter().copied());
                }
            }
        }
    }
    memo
}

/// Matches a single clause at a position, looking up sub-clause matches in
/// the memo table. Used by the fixpoint loop and, for terminals and
/// negative lookaheads, by the memo table's own on-demand lookups.
pub(crate) fn match_bottom_up(
    grammar: &Grammar,
    memo: &mut MemoTable<'_, '_>,
    key: MemoKey,
) -> Option<Match> {
    let input = memo.input();
    match grammar.clause(key.clause).body() {
        body @ (ClauseBody::Char(_)
        | ClauseBody::Str(_)
        | ClauseBody::CharSet(_)
        | ClauseBody::Any
        | ClauseBody::Nothing) => match_terminal(body, input, key),
        ClauseBody::Seq(ids) => {
            let mut pos = key.start;
            let mut subs = Vec::with_capacity(ids.len());
            for &sub in ids {
                let m = memo.look_up_best_match(MemoKey {
                    clause: sub,
                    start: pos,
                })?;
                pos += m.len();
                subs.push(m);
            }
            Some(Match::new(key, 0, pos - key.start, subs))
        }
        ClauseBody::First(ids) => {
            for (idx, &sub) in ids.iter().enumerate() {
                if let Some(m) = memo.look_up_best_match(MemoKey {
                    clause: sub,
                    start: key.start,
                }) {
                    return Some(Match::new(key, idx, m.len(), vec![m]));
                }
            }
            None
        }
        ClauseBody::Longest(ids) => {
            let mut best: Option<(usize, Rc<Match>)> = None;
            for (idx, &sub) in ids.iter().enumerate() {
                if let Some(m) = memo.look_up_best_match(MemoKey {
                    clause: sub,
                    start: key.start,
                }) {
                    // Iteration order makes ties resolve to the lowest index.
                    if best.as_ref().map_or(true, |(_, b)| m.len() > b.len()) {
                        best = Some((idx, m));
                    }
                }
            }
            best.map(|(idx, m)| Match::new(key, idx, m.len(), vec![m]))
        }
        &ClauseBody::OneOrMore(sub) => {
            let head = memo.look_up_best_match(MemoKey {
                clause: sub,
                start: key.start,
            })?;
            // Extend with a match of this same clause after the head; the
            // right-recursive spine keeps the table at one entry per
            // position instead of one per repetition count.
            let tail = memo.look_up_best_match(MemoKey {
                clause: key.clause,
                start: key.start + head.len(),
            });
            Some(match tail {
                Some(tail) => Match::new(key, 0, head.len() + tail.len(), vec![head, tail]),
                None => Match::new(key, 0, head.len(), vec![head]),
            })
        }
        &ClauseBody::FollowedBy(sub) => memo
            .look_up_best_match(MemoKey {
                clause: sub,
                start: key.start,
            })
            .map(|m| Match::new(key, 0, 0, vec![m])),
        &ClauseBody::NotFollowedBy(sub) => {
            match memo.look_up_best_match(MemoKey {
                clause: sub,
                start: key.start,
            }) {
                Some(_) => None,
                None => Some(Match::new(key, 0, 0, vec![])),
            }
        }
        ClauseBody::RuleRef(_) => unreachable!("rule refs are resolved at compile time"),
    }
}

fn match_terminal(body: &ClauseBody, input: &str, key: MemoKey) -> Option<Match> {
    let rest = &input[key.start..];
    match body {
        ClauseBody::Char(c) => rest
            .starts_with(*c)
            .then(|| Match::terminal(key, c.len_utf8())),
        ClauseBody::Str(s) => rest
            .starts_with(s.as_str())
            .then(|| Match::terminal(key, s.len())),
        ClauseBody::CharSet(set) => rest
            .chars()
            .next()
            .filter(|&c| set.matches(c))
            .map(|c| Match::terminal(key, c.len_utf8())),
        ClauseBody::Any => rest.chars().next().map(|c| Match::terminal(key, c.len_utf8())),
        ClauseBody::Nothing => Some(Match::terminal(key, 0)),
        _ => unreachable!("not a terminal"),
    }
}

/// Matches a clause at a position by direct recursion into its
/// sub-clauses, instead of memo lookups. Used for the lex clause's
/// subtree; only rule-root matches under it are memoized, and improved
/// insertions schedule their seed parents so the grammar above the lex
/// layer activates.
fn match_top_down(
    grammar: &Grammar,
    memo: &mut MemoTable<'_, '_>,
    key: MemoKey,
    active: &mut BTreeSet<ClauseId>,
) -> Option<Rc<Match>> {
    let clause = grammar.clause(key.clause);
    let is_rule_root = !clause.rule_names().is_empty();
    if is_rule_root {
        if let Some(found) = memo.best_match(key) {
            return Some(found);
        }
    }

    let found = match clause.body() {
        body @ (ClauseBody::Char(_)
        | ClauseBody::Str(_)
        | ClauseBody::CharSet(_)
        | ClauseBody::Any
        | ClauseBody::Nothing) => match_terminal(body, memo.input(), key),
        ClauseBody::Seq(ids) => {
            let ids = ids.clone();
            let mut pos = key.start;
            let mut subs = Vec::with_capacity(ids.len());
            let mut failed = false;
            for sub in ids {
                match match_top_down(
                    grammar,
                    memo,
                    MemoKey {
                        clause: sub,
                        start: pos,
                    },
                    active,
                ) {
                    Some(m) => {
                        pos += m.len();
                        subs.push(m);
                    }
                    None => {
                        failed = true;
                        break;
                    }
                }
            }
            (!failed).then(|| Match::new(key, 0, pos - key.start, subs))
        }
        ClauseBody::First(ids) => {
            let ids = ids.clone();
            let mut found = None;
            for (idx, sub) in ids.into_iter().enumerate() {
                if let Some(m) = match_top_down(
                    grammar,
                    memo,
                    MemoKey {
                        clause: sub,
                        start: key.start,
                    },
                    active,
                ) {
                    found = Some(Match::new(key, idx, m.len(), vec![m]));
                    break;
                }
            }
            found
        }
        ClauseBody::Longest(ids) => {
            let ids = ids.clone();
            let mut best: Option<(usize, Rc<Match>)> = None;
            for (idx, sub) in ids.into_iter().enumerate() {
                if let Some(m) = match_top_down(
                    grammar,
                    memo,
                    MemoKey {
                        clause: sub,
                        start: key.start,
                    },
                    active,
                ) {
                    if best.as_ref().map_or(true, |(_, b)| m.len() > b.len()) {
                        best = Some((idx, m));
                    }
                }
            }
            best.map(|(idx, m)| Match::new(key, idx, m.len(), vec![m]))
        }
        &ClauseBody::OneOrMore(sub) => {
            match match_top_down(
                grammar,
                memo,
                MemoKey {
                    clause: sub,
                    start: key.start,
                },
                active,
            ) {
                None => None,
                Some(head) if head.is_empty() => {
                    // A zero-width head cannot advance; close the spine.
                    Some(Match::new(key, 0, 0, vec![head]))
                }
                Some(head) => {
                    let tail = match_top_down(
                        grammar,
                        memo,
                        MemoKey {
                            clause: key.clause,
                            start: key.start + head.len(),
                        },
                        active,
                    );
                    Some(match tail {
                        Some(tail) => {
                            Match::new(key, 0, head.len() + tail.len(), vec![head, tail])
                        }
                        None => Match::new(key, 0, head.len(), vec![head]),
                    })
                }
            }
        }
        &ClauseBody::FollowedBy(sub) => match_top_down(
            grammar,
            memo,
            MemoKey {
                clause: sub,
                start: key.start,
            },
            active,
        )
        .map(|m| Match::new(key, 0, 0, vec![m])),
        &ClauseBody::NotFollowedBy(sub) => {
            match match_top_down(
                grammar,
                memo,
                MemoKey {
                    clause: sub,
                    start: key.start,
                },
                active,
            ) {
                Some(_) => None,
                None => Some(Match::new(key, 0, 0, vec![])),
            }
        }
        ClauseBody::RuleRef(_) => unreachable!("rule refs are resolved at compile time"),
    };

    let found = Rc::new(found?);
    if is_rule_root && memo.insert_best_match_rc(Rc::clone(&found)) {
        active.extend(grammar.clause(key.clause).seed_parents().iter().copied());
    }
    Some(found)
}
