// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # pika_meta
//!
//! The textual grammar form of [`pika`], parsed by pika itself: the
//! meta-grammar is one hand-constructed pika grammar, and everything above
//! it is an ordinary parse plus AST lifting.
//!
//! ```
//! let grammar = pika_meta::compile_grammar(
//!     "Program <- Statement+ ;
//!      Statement <- [a-z]+ '=' [0-9]+ ';' ;",
//! )
//! .unwrap();
//!
//! let memo = grammar.parse("x=1;y=2;");
//! assert!(memo.syntax_errors(&["Program"]).unwrap().is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/pika_meta")]
#![warn(missing_docs, rust_2018_idioms)]

use std::error;
use std::fmt;

pub mod ast_node;
pub mod parser;

pub use ast_node::AstNode;
pub use parser::{compile_grammar, parse_rules};

/// A span of grammar text no rule could parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxErrorSpan {
    /// The byte offset the span starts at.
    pub start: usize,
    /// The byte offset just past the span.
    pub end: usize,
    /// The text of the span.
    pub text: String,
}

/// An `enum` which defines the ways parsing grammar text can fail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GrammarParseError {
    /// The grammar text has spans the rule syntax does not cover.
    Syntax {
        /// The uncovered spans, in input order.
        errors: Vec<SyntaxErrorSpan>,
    },
    /// The text parsed, but a piece of it has no meaning (a multi-char
    /// single quote, an out-of-range precedence, ...).
    Invalid {
        /// What was wrong, with the offending text.
        message: String,
    },
    /// The parsed rules failed to compile.
    Grammar(pika::Error),
}

impl fmt::Display for GrammarParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarParseError::Syntax { errors } => {
                write!(f, "syntax error in grammar")?;
                for span in errors {
                    write!(f, "; at {}..{}: {:?}", span.start, span.end, span.text)?;
                }
                Ok(())
            }
            GrammarParseError::Invalid { message } => write!(f, "invalid grammar: {}", message),
            GrammarParseError::Grammar(inner) => write!(f, "grammar failed to compile: {}", inner),
        }
    }
}

impl error::Error for GrammarParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            GrammarParseError::Grammar(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<pika::Error> for GrammarParseError {
    fn from(inner: pika::Error) -> GrammarParseError {
        GrammarParseError::Grammar(inner)
    }
}
