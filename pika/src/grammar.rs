// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The compiled grammar: the clause DAG plus rule-name lookup.

use std::collections::HashMap;
use std::fmt;

use crate::ast;
use crate::clause::{Clause, ClauseId};
use crate::compile;
use crate::error::Error;
use crate::memo::MemoTable;
use crate::parser;

/// A rule after compilation: its (possibly precedence-suffixed) name and
/// the clause it resolved to.
#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) name: String,
    pub(crate) ast_label: Option<String>,
    pub(crate) clause: ClauseId,
}

/// A compiled grammar: an immutable clause DAG in bottom-up topological
/// order, shareable across any number of parses.
#[derive(Debug)]
pub struct Grammar {
    pub(crate) clauses: Vec<Clause>,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) rule_index: HashMap<String, usize>,
    /// Bare rule name → the name of its lowest precedence level, for rules
    /// that were split into precedence tiers.
    pub(crate) lowest_level: HashMap<String, String>,
    pub(crate) lex_clause: Option<ClauseId>,
    pub(crate) terminal_seeds: Vec<ClauseId>,
}

impl Grammar {
    /// Compiles a rule set into a grammar.
    pub fn compile(rules: Vec<ast::Rule>) -> Result<Grammar, Error> {
        compile::compile(rules, None)
    }

    /// Compiles a rule set, additionally marking `lex_rule` as the lexical
    /// layer: during parsing its clause tree is matched top-down at each
    /// position, so its internal terminals stay out of the memo table.
    /// The lex rule's clause tree must be acyclic.
    pub fn compile_with_lex(lex_rule: &str, rules: Vec<ast::Rule>) -> Result<Grammar, Error> {
        compile::compile(rules, Some(lex_rule))
    }

    /// Parses `input` against this grammar. Never fails; query the
    /// returned memo table for matches and syntax errors.
    pub fn parse<'g, 'i>(&'g self, input: &'i str) -> MemoTable<'g, 'i> {
        parser::parse(self, input)
    }

    /// The clause with the given id.
    pub fn clause(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.index()]
    }

    /// All clauses, in bottom-up topological order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The ids of all clauses, in the same order as [`Self::clauses`].
    pub fn clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        (0..self.clauses.len()).map(ClauseId::new)
    }

    /// The root clause of the named rule. A bare name of a
    /// precedence-tiered rule resolves to its lowest precedence level;
    /// suffixed names like `E[2]` address individual levels.
    pub fn rule_clause(&self, name: &str) -> Result<ClauseId, Error> {
        let direct = self.rule_index.get(name).or_else(|| {
            self.lowest_level
                .get(name)
                .and_then(|lowest| self.rule_index.get(lowest))
        });
        match direct {
            Some(&idx) => Ok(self.rules[idx].clause),
            None => Err(Error::UnknownRule {
                name: name.to_owned(),
            }),
        }
    }

    /// The AST node label attached at the named rule's root, if any.
    pub fn rule_label(&self, name: &str) -> Option<&str> {
        let idx = self.rule_index.get(name).or_else(|| {
            self.lowest_level
                .get(name)
                .and_then(|lowest| self.rule_index.get(lowest))
        })?;
        self.rules[*idx].ast_label.as_deref()
    }

    /// The names of all rules, in definition order (precedence-suffixed
    /// where the rewrite split a rule into levels).
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// The clause matched top-down as the lexical layer, if one was
    /// declared.
    pub fn lex_clause(&self) -> Option<ClauseId> {
        self.lex_clause
    }

    pub(crate) fn terminal_seeds(&self) -> &[ClauseId] {
        &self.terminal_seeds
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{} <- {} ;", rule.name, self.clauses[rule.clause.index()])?;
        }
        Ok(())
    }
}
