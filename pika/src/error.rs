// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Types for different kinds of grammar and query errors.

use std::error;
use std::fmt;

/// An `enum` which defines the possible grammar-compilation and query
/// errors.
///
/// Parsing itself never fails; a missing top-level match is data, reported
/// through the memo-table queries rather than through this type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The grammar contains no rules at all.
    EmptyGrammar,
    /// A rule was given an empty name.
    UnnamedRule,
    /// A rule's entire definition is a reference to itself.
    SelfOnlyRule {
        /// The offending rule's name.
        name: String,
    },
    /// Two rules share both a name and a precedence level.
    DuplicatePrecedenceLevel {
        /// The shared rule name.
        name: String,
        /// The shared precedence.
        precedence: i32,
    },
    /// A cycle was found where the clause graph must be acyclic: a chain of
    /// rules that are plain aliases of each other, or a cyclic lex rule.
    CyclicClause {
        /// The rule whose resolution closed the cycle.
        name: String,
    },
    /// A clause refers to a rule that the grammar does not define.
    UnknownRuleRef {
        /// The missing rule's name.
        name: String,
    },
    /// The requested lex rule is not defined by the grammar.
    UnknownLexRule {
        /// The missing rule's name.
        name: String,
    },
    /// A clause carries an empty AST node label.
    MissingLabel {
        /// The rule the empty label was found in.
        name: String,
    },
    /// A query named a rule the compiled grammar does not contain.
    UnknownRule {
        /// The unknown rule's name.
        name: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyGrammar => write!(f, "grammar must consist of at least one rule"),
            Error::UnnamedRule => write!(f, "all rules must be named"),
            Error::SelfOnlyRule { name } => {
                write!(f, "rule cannot refer to only itself: {}", name)
            }
            Error::DuplicatePrecedenceLevel { name, precedence } => write!(
                f,
                "multiple rules with name {} and precedence {}",
                name, precedence
            ),
            Error::CyclicClause { name } => {
                write!(f, "rule {} closes a cycle of rule references", name)
            }
            Error::UnknownRuleRef { name } => write!(f, "unknown rule reference: {}", name),
            Error::UnknownLexRule { name } => write!(f, "unknown lex rule name: {}", name),
            Error::MissingLabel { name } => {
                write!(f, "empty AST node label in rule {}", name)
            }
            Error::UnknownRule { name } => write!(f, "unknown rule name: {}", name),
        }
    }
}

impl error::Error for Error {}
