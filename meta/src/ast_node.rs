// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! AST nodes lifted out of a match tree.
//!
//! A match tree mirrors the clause structure, including every anonymous
//! sub-clause. The AST keeps only the positions the grammar labelled:
//! walking a match, a labelled sub-clause position becomes a node and
//! everything unlabelled dissolves, its own labelled descendants floating
//! up to the nearest labelled ancestor.

use std::rc::Rc;

use pika::{ClauseBody, Grammar, Match};

/// A node of the label-directed AST.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AstNode {
    /// The AST node label that created this node.
    pub label: String,
    /// The byte offset the node's span starts at.
    pub start: usize,
    /// The byte length of the node's span.
    pub len: usize,
    /// Labelled descendants, in input order.
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Builds the AST of `m`, rooted at a node labelled `label`.
    pub fn from_match(grammar: &Grammar, m: &Match, label: &str) -> AstNode {
        let mut children = vec![];
        collect_children(grammar, m, &mut children);
        AstNode {
            label: label.to_owned(),
            start: m.start(),
            len: m.len(),
            children,
        }
    }

    /// The byte offset just past the node's span.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The slice of `input` the node spans.
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        &input[self.start..self.end()]
    }
}

fn collect_children(grammar: &Grammar, m: &Match, out: &mut Vec<AstNode>) {
    for (slot, sub) in sub_matches_with_slots(grammar, m) {
        match grammar.clause(m.clause()).label(slot) {
            Some(label) => out.push(AstNode::from_match(grammar, &sub, label)),
            None => collect_children(grammar, &sub, out),
        }
    }
}

/// The child matches of `m` paired with the sub-clause slot each one
/// matched at. `OneOrMore` spines flatten into repeated slot-0 children;
/// choices report the slot of the alternative that won. Synthesized
/// zero-width matches have no children.
fn sub_matches_with_slots(grammar: &Grammar, m: &Match) -> Vec<(usize, Rc<Match>)> {
    if m.sub_matches().is_empty() {
        return vec![];
    }
    match grammar.clause(m.clause()).body() {
        ClauseBody::Seq(_) => m
            .sub_matches()
            .iter()
            .enumerate()
            .map(|(slot, sub)| (slot, Rc::clone(sub)))
            .collect(),
        ClauseBody::First(_) | ClauseBody::Longest(_) => {
            vec![(m.first_matching_sub_clause(), Rc::clone(&m.sub_matches()[0]))]
        }
        ClauseBody::OneOrMore(_) => {
            let mut flattened = vec![];
            let mut link = Rc::new(m.clone());
            loop {
                flattened.push((0, Rc::clone(&link.sub_matches()[0])));
                match link.sub_matches().get(1) {
                    Some(tail) => {
                        let tail = Rc::clone(tail);
                        link = tail;
                    }
                    None => break,
                }
            }
            flattened
        }
        ClauseBody::FollowedBy(_) => vec![(0, Rc::clone(&m.sub_matches()[0]))],
        _ => vec![],
    }
}
