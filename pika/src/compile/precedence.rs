// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The precedence/associativity rewrite: rules sharing a name become a
//! ladder of precedence levels, with self-references retargeted so that
//! left- and right-recursive readings resolve structurally instead of by
//! runtime recursion.

use std::collections::HashMap;

use crate::ast::{Assoc, Expr, Rule};

/// Rewrites every rule name with two or more precedence levels. Returns
/// the rewritten rules and the map from bare names to their lowest
/// precedence level's name.
pub(crate) fn rewrite(mut rules: Vec<Rule>) -> (Vec<Rule>, HashMap<String, String>) {
    let mut lowest_level = HashMap::new();

    let mut name_order: Vec<String> = vec![];
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, rule) in rules.iter().enumerate() {
        groups
            .entry(rule.name.clone())
            .or_insert_with(|| {
                name_order.push(rule.name.clone());
                vec![]
            })
            .push(idx);
    }

    for name in name_order {
        let mut levels = groups[&name].clone();
        if levels.len() < 2 {
            continue;
        }
        levels.sort_by_key(|&idx| rules[idx].precedence);
        let num_levels = levels.len();

        // Suffix each level's name with its precedence so all rule names
        // are unique after the rewrite.
        let level_names: Vec<String> = levels
            .iter()
            .map(|&idx| format!("{}[{}]", name, rules[idx].precedence))
            .collect();
        for (level, &idx) in levels.iter().enumerate() {
            rules[idx].name = level_names[level].clone();
        }

        for (level, &idx) in levels.iter().enumerate() {
            let curr = level_names[level].as_str();
            // "Next higher than top" wraps to the lowest level: the top
            // level is a precedence-breaking pattern like parentheses, and
            // its inner self-reference may contain anything.
            let next = level_names[(level + 1) % num_levels].as_str();
            let assoc = rules[idx].assoc;

            let num_self_refs = count_self_refs(&rules[idx].expr, &name);
            if num_self_refs >= 2 {
                if assoc == Assoc::Left {
                    // A left-associative level needs both the
                    // left-recursive and the non-left-recursive readings;
                    // the longest of the two wins.
                    let body = std::mem::replace(&mut rules[idx].expr, Expr::Nothing);
                    rules[idx].expr = Expr::Longest(vec![body.clone(), body]);
                }
                let mut seen = 0;
                retarget_self_refs(
                    &mut rules[idx].expr,
                    assoc,
                    &mut seen,
                    num_self_refs,
                    &name,
                    curr,
                    next,
                );
            } else if num_self_refs == 1 {
                // A single self-reference just tries this level, then the
                // next higher one.
                retarget_single_self_ref(&mut rules[idx].expr, &name, curr, next);
            }

            // All levels but the top fall through to the next higher level
            // when they fail to match.
            if level < num_levels - 1 {
                let body = std::mem::replace(&mut rules[idx].expr, Expr::Nothing);
                rules[idx].expr = Expr::First(vec![body, Expr::Ident(next.to_owned())]);
            }
        }

        lowest_level.insert(name, level_names[0].clone());
    }

    (rules, lowest_level)
}

fn count_self_refs(expr: &Expr, name: &str) -> usize {
    match expr {
        Expr::Ident(referenced) if referenced == name => 1,
        _ => expr
            .children()
            .iter()
            .map(|child| count_self_refs(child, name))
            .sum(),
    }
}

/// Retargets every self-reference by its position: the leftmost of a
/// left-associative level (or the rightmost of a right-associative one)
/// stays at the current level; every other self-reference moves to the
/// next higher level.
fn retarget_self_refs(
    expr: &mut Expr,
    assoc: Assoc,
    seen: &mut usize,
    num_self_refs: usize,
    name: &str,
    curr: &str,
    next: &str,
) {
    if let Expr::Ident(referenced) = expr {
        if referenced.as_str() == name {
            let stays = (assoc == Assoc::Left && *seen == 0)
                || (assoc == Assoc::Right && *seen == num_self_refs - 1);
            *referenced = if stays { curr.to_owned() } else { next.to_owned() };
            *seen += 1;
            return;
        }
    }
    for child in expr.children_mut() {
        retarget_self_refs(child, assoc, seen, num_self_refs, name, curr, next);
    }
}

fn retarget_single_self_ref(expr: &mut Expr, name: &str, curr: &str, next: &str) -> bool {
    for child in expr.children_mut() {
        if matches!(child, Expr::Ident(referenced) if referenced.as_str() == name) {
            *child = Expr::First(vec![
                Expr::Ident(curr.to_owned()),
                Expr::Ident(next.to_owned()),
            ]);
            return true;
        }
        if retarget_single_self_ref(child, name, curr, next) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ch, char_range, ident, prec_rule, rule, seq};
    use pretty_assertions::assert_eq;

    #[test]
    fn single_level_rules_are_untouched() {
        let rules = vec![rule("A", seq(vec![ident("A"), ch('a')]))];
        let (rewritten, lowest) = rewrite(rules.clone());
        assert_eq!(rewritten, rules);
        assert!(lowest.is_empty());
    }

    #[test]
    fn left_associative_level_gets_longest_wrap() {
        let rules = vec![
            prec_rule(
                "E",
                0,
                Assoc::Left,
                seq(vec![ident("E"), ch('+'), ident("E")]),
            ),
            prec_rule("E", 1, Assoc::None, char_range('0', '9')),
        ];
        let (rewritten, lowest) = rewrite(rules);

        // The leftmost self-reference stays at this level; the rest move
        // up, and the whole level falls through to E[1].
        assert_eq!(rewritten[0].name, "E[0]");
        assert_eq!(
            rewritten[0].expr,
            Expr::First(vec![
                Expr::Longest(vec![
                    seq(vec![ident("E[0]"), ch('+'), ident("E[1]")]),
                    seq(vec![ident("E[1]"), ch('+'), ident("E[1]")]),
                ]),
                ident("E[1]"),
            ])
        );
        // The top level is left alone apart from the rename.
        assert_eq!(rewritten[1].name, "E[1]");
        assert_eq!(rewritten[1].expr, char_range('0', '9'));
        assert_eq!(lowest["E"], "E[0]");
    }

    #[test]
    fn right_associative_level_keeps_last_self_ref() {
        let rules = vec![
            prec_rule(
                "E",
                0,
                Assoc::Right,
                seq(vec![ident("E"), ch('^'), ident("E")]),
            ),
            prec_rule("E", 1, Assoc::None, char_range('0', '9')),
        ];
        let (rewritten, _) = rewrite(rules);

        assert_eq!(
            rewritten[0].expr,
            Expr::First(vec![
                seq(vec![ident("E[1]"), ch('^'), ident("E[0]")]),
                ident("E[1]"),
            ])
        );
    }

    #[test]
    fn single_self_ref_becomes_level_choice() {
        let rules = vec![
            prec_rule("E", 0, Assoc::None, seq(vec![ch('-'), ident("E")])),
            prec_rule("E", 1, Assoc::None, char_range('0', '9')),
        ];
        let (rewritten, _) = rewrite(rules);

        assert_eq!(
            rewritten[0].expr,
            Expr::First(vec![
                seq(vec![
                    ch('-'),
                    Expr::First(vec![ident("E[0]"), ident("E[1]")]),
                ]),
                ident("E[1]"),
            ])
        );
    }

    #[test]
    fn top_level_self_ref_wraps_to_lowest() {
        let rules = vec![
            prec_rule(
                "E",
                0,
                Assoc::None,
                seq(vec![ident("E"), ch('+'), ident("E")]),
            ),
            prec_rule(
                "E",
                1,
                Assoc::None,
                seq(vec![ch('('), ident("E"), ch(')')]),
            ),
        ];
        let (rewritten, _) = rewrite(rules);

        // The parenthesis pattern re-enters at the lowest level, but the
        // top level itself has no fall-through.
        assert_eq!(
            rewritten[1].expr,
            seq(vec![
                ch('('),
                Expr::First(vec![ident("E[1]"), ident("E[0]")]),
                ch(')'),
            ])
        );
    }

    #[test]
    fn levels_sort_by_precedence_not_definition_order() {
        let rules = vec![
            prec_rule("E", 5, Assoc::None, char_range('0', '9')),
            prec_rule("E", 2, Assoc::None, seq(vec![ch('-'), ident("E")])),
        ];
        let (rewritten, lowest) = rewrite(rules);
        assert_eq!(rewritten[0].name, "E[5]");
        assert_eq!(rewritten[1].name, "E[2]");
        assert_eq!(lowest["E"], "E[2]");
    }
}
