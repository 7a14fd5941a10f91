// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Rule-reference resolution: every `RuleRef` edge is redirected to the
//! referenced rule's root clause, turning the interned forest into the
//! final (possibly recursive) DAG.

use std::collections::{HashMap, HashSet};

use crate::clause::ClauseBody;
use crate::compile::ClauseArena;
use crate::error::Error;

pub(crate) fn resolve(arena: &mut ClauseArena) -> Result<(), Error> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    for (idx, rule) in arena.rules.iter().enumerate() {
        if by_name.insert(rule.name.clone(), idx).is_some() {
            unreachable!("duplicate rule name after precedence rewrite: {}", rule.name);
        }
    }

    // Rule roots that are themselves references resolve through the alias
    // chain; a chain that returns to a visited rule is a cycle with no
    // matchable clause on it.
    let mut resolved_roots = Vec::with_capacity(arena.rules.len());
    for idx in 0..arena.rules.len() {
        let mut visited = HashSet::from([idx]);
        let mut at = idx;
        loop {
            let clause = arena.rules[at].clause;
            match &arena.clauses[clause.index()].body {
                ClauseBody::RuleRef(target) => {
                    let target_idx = rule_idx(&by_name, &arena.lowest_level, target)
                        .ok_or_else(|| Error::UnknownRuleRef {
                            name: target.clone(),
                        })?;
                    if !visited.insert(target_idx) {
                        return Err(Error::CyclicClause {
                            name: arena.rules[idx].name.clone(),
                        });
                    }
                    at = target_idx;
                }
                _ => {
                    resolved_roots.push(clause);
                    break;
                }
            }
        }
    }

    // Redirect child edges, and pull the referenced rule's AST label into
    // the referring slot so labels survive the loss of the RuleRef node.
    for idx in 0..arena.clauses.len() {
        let num_children = arena.clauses[idx].body.sub_clauses().len();
        for slot in 0..num_children {
            let child = arena.clauses[idx].body.sub_clauses()[slot];
            let target = match &arena.clauses[child.index()].body {
                ClauseBody::RuleRef(name) => rule_idx(&by_name, &arena.lowest_level, name)
                    .ok_or_else(|| Error::UnknownRuleRef { name: name.clone() })?,
                _ => continue,
            };
            arena.clauses[idx].body.sub_clauses_mut()[slot] = resolved_roots[target];
            if let Some(rule_label) = arena.rules[target].ast_label.clone() {
                let labels = &mut arena.clauses[idx].sub_clause_labels;
                if labels.len() < num_children {
                    labels.resize(num_children, None);
                }
                labels[slot].get_or_insert(rule_label);
            }
        }
    }

    for idx in 0..arena.rules.len() {
        arena.rules[idx].clause = resolved_roots[idx];
        let name = arena.rules[idx].name.clone();
        arena.clauses[resolved_roots[idx].index()].rule_names.push(name);
    }
    Ok(())
}

fn rule_idx(
    by_name: &HashMap<String, usize>,
    lowest_level: &HashMap<String, String>,
    name: &str,
) -> Option<usize> {
    by_name.get(name).copied().or_else(|| {
        lowest_level
            .get(name)
            .and_then(|lowest| by_name.get(lowest))
            .copied()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ch, ident, one_or_more, rule, seq};
    use crate::compile::intern::intern;
    use std::collections::HashMap;

    fn resolved(rules: Vec<crate::ast::Rule>) -> Result<ClauseArena, Error> {
        let mut arena = intern(rules, HashMap::new());
        resolve(&mut arena)?;
        Ok(arena)
    }

    #[test]
    fn redirects_edges_to_rule_roots() {
        let arena = resolved(vec![
            rule("A", one_or_more(ident("B"))),
            rule("B", ch('b')),
        ])
        .unwrap();
        let a_root = arena.rules[0].clause;
        let b_root = arena.rules[1].clause;
        match arena.clauses[a_root.index()].body {
            ClauseBody::OneOrMore(child) => assert_eq!(child, b_root),
            ref body => panic!("expected OneOrMore, got {:?}", body),
        }
    }

    #[test]
    fn resolves_alias_chains() {
        let arena = resolved(vec![
            rule("A", ident("B")),
            rule("B", ident("C")),
            rule("C", ch('c')),
        ])
        .unwrap();
        assert_eq!(arena.rules[0].clause, arena.rules[2].clause);
        let names = &arena.clauses[arena.rules[2].clause.index()].rule_names;
        assert_eq!(names, &["A", "B", "C"]);
    }

    #[test]
    fn rejects_alias_cycles() {
        let result = resolved(vec![rule("A", ident("B")), rule("B", ident("A"))]);
        assert_eq!(
            result.err(),
            Some(Error::CyclicClause {
                name: "A".to_owned()
            })
        );
    }

    #[test]
    fn rejects_unknown_references() {
        let result = resolved(vec![rule("A", seq(vec![ch('a'), ident("Missing")]))]);
        assert_eq!(
            result.err(),
            Some(Error::UnknownRuleRef {
                name: "Missing".to_owned()
            })
        );
    }
}
