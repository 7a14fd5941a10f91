// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The grammar compiler: a pipeline of passes turning a rule list into an
//! interned, analyzed clause DAG.

use std::collections::HashMap;

use crate::ast;
use crate::clause::Clause;
use crate::error::Error;
use crate::grammar::{CompiledRule, Grammar};

mod analyze;
mod intern;
mod precedence;
mod resolve;
mod validate;

/// The clauses and rules between interning and final analysis.
pub(crate) struct ClauseArena {
    pub(crate) clauses: Vec<Clause>,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) lowest_level: HashMap<String, String>,
}

/// Compiles `rules`, optionally marking `lex_rule` as the lexical layer.
pub(crate) fn compile(rules: Vec<ast::Rule>, lex_rule: Option<&str>) -> Result<Grammar, Error> {
    validate::check(&rules)?;
    let (rules, lowest_level) = precedence::rewrite(rules);
    let mut arena = intern::intern(rules, lowest_level);
    resolve::resolve(&mut arena)?;
    let mut grammar = analyze::analyze(arena);

    if let Some(name) = lex_rule {
        let clause = grammar.rule_clause(name).map_err(|_| Error::UnknownLexRule {
            name: name.to_owned(),
        })?;
        analyze::check_acyclic(&grammar, clause, name)?;
        grammar.lex_clause = Some(clause);
    }
    Ok(grammar)
}
