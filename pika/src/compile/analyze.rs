// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Final analysis over the resolved DAG: reachability ordering, zero-width
//! analysis and seed-parent linking.

use std::collections::HashMap;

use crate::clause::{Clause, ClauseBody, ClauseId};
use crate::compile::ClauseArena;
use crate::error::Error;
use crate::grammar::Grammar;

pub(crate) fn analyze(arena: ClauseArena) -> Grammar {
    let ClauseArena {
        clauses,
        mut rules,
        lowest_level,
    } = arena;

    // Reachable clauses in depth-first post-order: children precede the
    // parents that reference them (recursive back edges aside), which is
    // both the zero-width evaluation order and the parser's bottom-up
    // priority order. Orphaned RuleRef nodes drop out here.
    let mut visited = vec![false; clauses.len()];
    let mut order = vec![];
    for rule in &rules {
        collect_post_order(rule.clause.index(), &clauses, &mut visited, &mut order);
    }

    let mut remap: Vec<Option<ClauseId>> = vec![None; clauses.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        remap[old_idx] = Some(ClauseId::new(new_idx));
    }

    let mut taken: Vec<Option<Clause>> = clauses.into_iter().map(Some).collect();
    let mut reindexed: Vec<Clause> = Vec::with_capacity(order.len());
    for &old_idx in &order {
        let mut clause = taken[old_idx].take().expect("clause visited once");
        for child in clause.body.sub_clauses_mut() {
            *child = remap[child.index()].expect("child reachable with its parent");
        }
        reindexed.push(clause);
    }
    for rule in &mut rules {
        rule.clause = remap[rule.clause.index()].expect("rule root reachable");
    }

    // Zero-width analysis, one monotone pass in bottom-up order. A child
    // behind a recursive back edge reads as false here, which
    // under-approximates exactly as matching itself would.
    for idx in 0..reindexed.len() {
        let can_match_zero = match &reindexed[idx].body {
            ClauseBody::Nothing => true,
            ClauseBody::Str(s) => s.is_empty(),
            ClauseBody::Char(_) | ClauseBody::CharSet(_) | ClauseBody::Any => false,
            ClauseBody::Seq(ids) => ids
                .iter()
                .all(|id| reindexed[id.index()].can_match_zero),
            ClauseBody::First(ids) | ClauseBody::Longest(ids) => ids
                .iter()
                .any(|id| reindexed[id.index()].can_match_zero),
            &ClauseBody::OneOrMore(id) => reindexed[id.index()].can_match_zero,
            // A positive lookahead is zero-width when it matches, but it
            // only matches where its subclause does; it may be
            // synthesized only if the subclause could be.
            &ClauseBody::FollowedBy(id) => reindexed[id.index()].can_match_zero,
            ClauseBody::NotFollowedBy(_) => true,
            ClauseBody::RuleRef(_) => unreachable!("rule refs are resolved before analysis"),
        };
        reindexed[idx].can_match_zero = can_match_zero;
    }

    // Seed-parent linking. For Seq, a child can only open a new parent
    // match while everything before it can match zero characters, so the
    // seeds are the leading children through the first non-zero-width one.
    for idx in 0..reindexed.len() {
        let parent = ClauseId::new(idx);
        let seeds: Vec<ClauseId> = match &reindexed[idx].body {
            ClauseBody::Seq(ids) => {
                let mut seeds = vec![];
                for &id in ids {
                    seeds.push(id);
                    if !reindexed[id.index()].can_match_zero {
                        break;
                    }
                }
                seeds
            }
            ClauseBody::First(ids) | ClauseBody::Longest(ids) => ids.clone(),
            &(ClauseBody::OneOrMore(id)
            | ClauseBody::FollowedBy(id)
            | ClauseBody::NotFollowedBy(id)) => vec![id],
            _ => vec![],
        };
        for seed in seeds {
            let parents = &mut reindexed[seed.index()].seed_parents;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }

    let terminal_seeds = reindexed
        .iter()
        .enumerate()
        .filter(|(_, clause)| clause.is_terminal() && !matches!(clause.body, ClauseBody::Nothing))
        .map(|(idx, _)| ClauseId::new(idx))
        .collect();

    let rule_index: HashMap<String, usize> = rules
        .iter()
        .enumerate()
        .map(|(idx, rule)| (rule.name.clone(), idx))
        .collect();

    Grammar {
        clauses: reindexed,
        rules,
        rule_index,
        lowest_level,
        lex_clause: None,
        terminal_seeds,
    }
}

fn collect_post_order(
    idx: usize,
    clauses: &[Clause],
    visited: &mut [bool],
    order: &mut Vec<usize>,
) {
    if visited[idx] {
        return;
    }
    visited[idx] = true;
    for child in clauses[idx].body.sub_clauses() {
        collect_post_order(child.index(), clauses, visited, order);
    }
    order.push(idx);
}

/// Checks that no cycle is reachable from `root`; used for the lex clause,
/// which must be matchable by plain recursion.
pub(crate) fn check_acyclic(
    grammar: &Grammar,
    root: ClauseId,
    rule_name: &str,
) -> Result<(), Error> {
    const UNSEEN: u8 = 0;
    const OPEN: u8 = 1;
    const CLOSED: u8 = 2;

    fn dfs(grammar: &Grammar, id: ClauseId, state: &mut [u8]) -> bool {
        match state[id.index()] {
            OPEN => return true,
            CLOSED => return false,
            _ => {}
        }
        state[id.index()] = OPEN;
        for &child in grammar.clause(id).sub_clauses() {
            if dfs(grammar, child, state) {
                return true;
            }
        }
        state[id.index()] = CLOSED;
        false
    }

    let mut state = vec![UNSEEN; grammar.clauses().len()];
    if dfs(grammar, root, &mut state) {
        return Err(Error::CyclicClause {
            name: rule_name.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ch, ident, lit, one_or_more, optional, rule, seq, zero_or_more};
    use crate::grammar::Grammar;

    fn compiled(rules: Vec<crate::ast::Rule>) -> Grammar {
        Grammar::compile(rules).unwrap()
    }

    fn clause_zero_width(grammar: &Grammar, rule: &str) -> bool {
        grammar
            .clause(grammar.rule_clause(rule).unwrap())
            .can_match_zero()
    }

    #[test]
    fn children_precede_parents() {
        let grammar = compiled(vec![rule(
            "A",
            seq(vec![ch('a'), one_or_more(ch('b'))]),
        )]);
        for (idx, clause) in grammar.clauses().iter().enumerate() {
            for child in clause.sub_clauses() {
                assert!(
                    child.index() < idx,
                    "child {} of acyclic clause {} must come first",
                    child,
                    idx
                );
            }
        }
    }

    #[test]
    fn zero_width_table() {
        let grammar = compiled(vec![
            rule("Opt", optional(ch('a'))),
            rule("Star", zero_or_more(ch('a'))),
            rule("Plus", one_or_more(ch('a'))),
            rule("PlusOpt", one_or_more(optional(ch('a')))),
            rule("SeqZero", seq(vec![optional(ch('a')), optional(ch('b'))])),
            rule("SeqMixed", seq(vec![optional(ch('a')), ch('b')])),
            rule("Lit", lit("ab")),
        ]);
        assert!(clause_zero_width(&grammar, "Opt"));
        assert!(clause_zero_width(&grammar, "Star"));
        assert!(!clause_zero_width(&grammar, "Plus"));
        assert!(clause_zero_width(&grammar, "PlusOpt"));
        assert!(clause_zero_width(&grammar, "SeqZero"));
        assert!(!clause_zero_width(&grammar, "SeqMixed"));
        assert!(!clause_zero_width(&grammar, "Lit"));
    }

    #[test]
    fn seq_seeds_stop_at_first_consuming_child() {
        let grammar = compiled(vec![rule(
            "A",
            seq(vec![optional(ch('a')), ch('b'), ch('c')]),
        )]);
        let root = grammar.rule_clause("A").unwrap();
        let seq_clause = grammar.clause(root);
        let children = seq_clause.sub_clauses().to_vec();

        // The optional first child and the first consuming child seed the
        // sequence; the child after it cannot open a new match.
        assert!(grammar.clause(children[0]).seed_parents().contains(&root));
        assert!(grammar.clause(children[1]).seed_parents().contains(&root));
        assert!(!grammar.clause(children[2]).seed_parents().contains(&root));
    }

    #[test]
    fn terminal_seeds_exclude_nothing() {
        let grammar = compiled(vec![rule("A", seq(vec![optional(ch('a')), ch('b')]))]);
        for &seed in grammar.terminal_seeds() {
            assert!(!matches!(
                grammar.clause(seed).body(),
                ClauseBody::Nothing
            ));
        }
        // 'a' and 'b' both seed.
        assert_eq!(grammar.terminal_seeds().len(), 2);
    }

    #[test]
    fn lex_rule_must_be_acyclic() {
        let cyclic = Grammar::compile_with_lex(
            "Tok",
            vec![rule("Tok", seq(vec![ch('('), ident("Tok"), ch(')')]))],
        );
        assert_eq!(
            cyclic.err(),
            Some(Error::CyclicClause {
                name: "Tok".to_owned()
            })
        );

        let flat = Grammar::compile_with_lex(
            "Tok",
            vec![rule("Tok", one_or_more(ch('a')))],
        );
        assert!(flat.is_ok());
    }

    #[test]
    fn unknown_lex_rule() {
        let result = Grammar::compile_with_lex("Nope", vec![rule("A", ch('a'))]);
        assert_eq!(
            result.err(),
            Some(Error::UnknownLexRule {
                name: "Nope".to_owned()
            })
        );
    }
}
