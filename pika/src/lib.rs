// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # pika. The Bottom-Up Parser
//!
//! pika is a PEG parsing engine that works as the dual of packrat parsing:
//! bottom-up and right to left, memoizing the best match of every clause
//! at every input position. That makes left-recursive rules parse directly
//! (after a structural grammar rewrite) and makes error recovery a query
//! instead of a mechanism — after one parse, every rule's matches across
//! the whole input are simply enumerable, as are the spans nothing
//! matched.
//!
//! A grammar is built from [`ast`] rules and compiled once:
//!
//! ```
//! use pika::ast::{char_range, ch, ident, one_or_more, rule, seq};
//! use pika::Grammar;
//!
//! let grammar = Grammar::compile(vec![
//!     rule("Program", one_or_more(ident("Assign"))),
//!     rule(
//!         "Assign",
//!         seq(vec![
//!             one_or_more(char_range('a', 'z')),
//!             ch('='),
//!             one_or_more(char_range('0', '9')),
//!             ch(';'),
//!         ]),
//!     ),
//! ])
//! .unwrap();
//!
//! let memo = grammar.parse("x=1;y=22;");
//! let matches = memo.non_overlapping_matches_for_rule("Assign").unwrap();
//! assert_eq!(matches.len(), 2);
//! assert!(memo.syntax_errors(&["Program"]).unwrap().is_empty());
//! ```
//!
//! Parsing never fails. A syntax error is the *absence* of coverage,
//! reported by [`MemoTable::syntax_errors`] as the exact input spans no
//! named rule tiled.

#![doc(html_root_url = "https://docs.rs/pika")]
#![warn(missing_docs, rust_2018_idioms)]

pub mod ast;
mod clause;
mod compile;
mod error;
mod grammar;
mod intervals;
mod memo;
mod parser;

pub use clause::{CharSet, Clause, ClauseBody, ClauseId};
pub use error::Error;
pub use grammar::Grammar;
pub use memo::{Match, MemoKey, MemoTable};
pub use parser::parse;
