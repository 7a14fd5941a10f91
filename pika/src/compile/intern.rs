// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Tree-to-arena conversion: clauses are interned bottom-up by their
//! canonical string form, so structurally equal sub-expressions anywhere
//! in the grammar share one node and activate all their parents together.
//!
//! The same pass lowers `ZeroOrMore`/`Optional` into their
//! `First(..., Nothing)` forms and lifts AST node labels out of the
//! expression tree: a label at a rule root moves into the rule, a label on
//! a child moves into the parent's per-slot label table. Labels never
//! affect matching, but they are part of the canonical form, so a labelled
//! clause interns apart from an unlabelled twin.

use std::collections::HashMap;
use std::fmt::Write;

use crate::ast::{Expr, Rule};
use crate::clause::{self, Clause, ClauseBody, ClauseId};
use crate::compile::ClauseArena;
use crate::grammar::CompiledRule;

pub(crate) fn intern(rules: Vec<Rule>, lowest_level: HashMap<String, String>) -> ClauseArena {
    let mut interner = Interner {
        clauses: vec![],
        by_repr: HashMap::new(),
    };

    let mut compiled = vec![];
    for rule in rules {
        let mut expr = rule.expr;
        let mut ast_label = None;
        while let Expr::Label(name, inner) = expr {
            ast_label.get_or_insert(name);
            expr = *inner;
        }
        let clause = interner.intern_expr(expr);
        compiled.push(CompiledRule {
            name: rule.name,
            ast_label,
            clause,
        });
    }

    ClauseArena {
        clauses: interner.clauses,
        rules: compiled,
        lowest_level,
    }
}

struct Interner {
    clauses: Vec<Clause>,
    by_repr: HashMap<String, ClauseId>,
}

impl Interner {
    fn intern_expr(&mut self, expr: Expr) -> ClauseId {
        match expr {
            Expr::Char(c) => self.insert(ClauseBody::Char(c), vec![]),
            Expr::Str(s) => self.insert(ClauseBody::Str(s), vec![]),
            Expr::CharSet(set) => self.insert(ClauseBody::CharSet(set), vec![]),
            Expr::Any => self.insert(ClauseBody::Any, vec![]),
            Expr::Nothing => self.insert(ClauseBody::Nothing, vec![]),
            Expr::Ident(name) => self.insert(ClauseBody::RuleRef(name), vec![]),
            Expr::Seq(children) => {
                let (ids, labels) = self.intern_children(children);
                self.insert(ClauseBody::Seq(ids), labels)
            }
            Expr::First(children) => {
                let (ids, labels) = self.intern_children(children);
                self.insert(ClauseBody::First(ids), labels)
            }
            Expr::Longest(children) => {
                let (ids, labels) = self.intern_children(children);
                self.insert(ClauseBody::Longest(ids), labels)
            }
            Expr::OneOrMore(child) => {
                let (ids, labels) = self.intern_children(vec![*child]);
                self.insert(ClauseBody::OneOrMore(ids[0]), labels)
            }
            Expr::FollowedBy(child) => {
                let (ids, labels) = self.intern_children(vec![*child]);
                self.insert(ClauseBody::FollowedBy(ids[0]), labels)
            }
            Expr::NotFollowedBy(child) => {
                let (ids, labels) = self.intern_children(vec![*child]);
                self.insert(ClauseBody::NotFollowedBy(ids[0]), labels)
            }
            Expr::ZeroOrMore(child) => {
                let lowered = Expr::First(vec![Expr::OneOrMore(child), Expr::Nothing]);
                self.intern_expr(lowered)
            }
            Expr::Optional(child) => {
                let lowered = Expr::First(vec![*child, Expr::Nothing]);
                self.intern_expr(lowered)
            }
            // A label not sitting at a rule root or a child slot (a label
            // directly inside a label); the outermost one has already been
            // taken.
            Expr::Label(_, inner) => self.intern_expr(*inner),
        }
    }

    fn intern_children(&mut self, children: Vec<Expr>) -> (Vec<ClauseId>, Vec<Option<String>>) {
        let mut ids = Vec::with_capacity(children.len());
        let mut labels = Vec::with_capacity(children.len());
        for mut child in children {
            let mut label = None;
            while let Expr::Label(name, inner) = child {
                label.get_or_insert(name);
                child = *inner;
            }
            ids.push(self.intern_expr(child));
            labels.push(label);
        }
        if labels.iter().all(Option::is_none) {
            labels.clear();
        }
        (ids, labels)
    }

    fn insert(&mut self, body: ClauseBody, labels: Vec<Option<String>>) -> ClauseId {
        let repr = self.repr_of(&body, &labels);
        if let Some(&id) = self.by_repr.get(&repr) {
            return id;
        }
        let id = ClauseId::new(self.clauses.len());
        self.clauses.push(Clause {
            body,
            sub_clause_labels: labels,
            can_match_zero: false,
            seed_parents: vec![],
            rule_names: vec![],
            repr: repr.clone(),
        });
        self.by_repr.insert(repr, id);
        id
    }

    /// The canonical string form. Built while children are still interned
    /// by name, so it stays finite for recursive grammars; rule-reference
    /// resolution later rewires the edges without touching it.
    fn repr_of(&self, body: &ClauseBody, labels: &[Option<String>]) -> String {
        let mut out = String::new();
        match body {
            ClauseBody::Char(c) => {
                out.push('\'');
                push_quoted(&mut out, *c, '\'');
                out.push('\'');
            }
            ClauseBody::Str(s) => {
                out.push('"');
                for c in s.chars() {
                    push_quoted(&mut out, c, '"');
                }
                out.push('"');
            }
            ClauseBody::CharSet(set) => {
                let _ = write!(out, "{}", set);
            }
            ClauseBody::Any => out.push('.'),
            ClauseBody::Nothing => out.push_str("()"),
            ClauseBody::RuleRef(name) => out.push_str(name),
            ClauseBody::Seq(ids) => self.push_joined(&mut out, ids, labels, " "),
            ClauseBody::First(ids) => self.push_joined(&mut out, ids, labels, " / "),
            ClauseBody::Longest(ids) => self.push_joined(&mut out, ids, labels, " | "),
            ClauseBody::OneOrMore(id) => {
                out.push('(');
                self.push_child(&mut out, *id, labels.first());
                out.push_str(")+");
            }
            ClauseBody::FollowedBy(id) => {
                out.push('&');
                self.push_child(&mut out, *id, labels.first());
            }
            ClauseBody::NotFollowedBy(id) => {
                out.push('!');
                self.push_child(&mut out, *id, labels.first());
            }
        }
        out
    }

    fn push_joined(
        &self,
        out: &mut String,
        ids: &[ClauseId],
        labels: &[Option<String>],
        separator: &str,
    ) {
        out.push('(');
        for (idx, &id) in ids.iter().enumerate() {
            if idx > 0 {
                out.push_str(separator);
            }
            self.push_child(out, id, labels.get(idx));
        }
        out.push(')');
    }

    fn push_child(&self, out: &mut String, id: ClauseId, label: Option<&Option<String>>) {
        if let Some(Some(label)) = label {
            out.push_str(label);
            out.push(':');
        }
        out.push_str(&self.clauses[id.index()].repr);
    }
}

fn push_quoted(out: &mut String, c: char, quote: char) {
    if c == quote || c == '\\' {
        out.push('\\');
        out.push(c);
    } else {
        let _ = clause::write_escaped(out, c);
    }
}
