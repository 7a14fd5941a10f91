// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The meta-grammar: pika's textual rule form, parsed by a
//! hand-constructed pika grammar. The bootstrap stops here — this grammar
//! is built with the programmatic API, everything after it can be text.

use once_cell::sync::Lazy;

use pika::ast::{
    self, ch, char_range, first, ident, label, lit, one_or_more, optional, prec_rule, rule, seq,
    zero_or_more, Assoc, Expr,
};
use pika::{CharSet, Grammar};

use crate::ast_node::AstNode;
use crate::{GrammarParseError, SyntaxErrorSpan};

// AST node labels. Each one marks a position in the meta-grammar whose
// match becomes a node; everything else dissolves during AST lifting.
const RULE: &str = "Rule";
const IDENT: &str = "Ident";
const PREC: &str = "Prec";
const L_ASSOC: &str = "LAssoc";
const R_ASSOC: &str = "RAssoc";
const SEQ: &str = "Seq";
const FIRST: &str = "First";
const ONE_OR_MORE: &str = "OneOrMore";
const ZERO_OR_MORE: &str = "ZeroOrMore";
const OPTIONAL: &str = "Optional";
const FOLLOWED_BY: &str = "FollowedBy";
const NOT_FOLLOWED_BY: &str = "NotFollowedBy";
const LABEL: &str = "Label";
const LABEL_NAME: &str = "LabelName";
const LABEL_CLAUSE: &str = "LabelClause";
const STR: &str = "Str";
const QUOTED_CHAR: &str = "QuotedChar";
const CHAR_RANGE: &str = "CharRange";
const NOTHING: &str = "Nothing";
const ANY: &str = "Any";

/// The hand-constructed grammar of the textual rule form. Ordered-choice
/// precedence of the clause syntax runs from alternation (loosest) up to
/// parentheses, encoded as precedence levels of the one `CLAUSE` rule.
static META_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    Grammar::compile(vec![
        rule("GRAMMAR", seq(vec![ident("WSC"), one_or_more(ident("RULE"))])),
        rule(
            "RULE",
            label(
                RULE,
                seq(vec![
                    ident("IDENT"),
                    ident("WSC"),
                    optional(ident("PREC")),
                    lit("<-"),
                    ident("WSC"),
                    ident("CLAUSE"),
                    ident("WSC"),
                    ch(';'),
                    ident("WSC"),
                ]),
            ),
        ),
        prec_rule(
            "CLAUSE",
            8,
            Assoc::None,
            seq(vec![
                ch('('),
                ident("WSC"),
                ident("CLAUSE"),
                ident("WSC"),
                ch(')'),
            ]),
        ),
        prec_rule(
            "CLAUSE",
            7,
            Assoc::None,
            first(vec![
                ident("IDENT"),
                ident("QUOTED_STRING"),
                ident("CHAR_SET"),
                ident("NOTHING"),
                ident("ANYCHAR"),
            ]),
        ),
        prec_rule(
            "CLAUSE",
            6,
            Assoc::None,
            first(vec![
                seq(vec![
                    label(ONE_OR_MORE, ident("CLAUSE")),
                    ident("WSC"),
                    ch('+'),
                ]),
                seq(vec![
                    label(ZERO_OR_MORE, ident("CLAUSE")),
                    ident("WSC"),
                    ch('*'),
                ]),
            ]),
        ),
        prec_rule(
            "CLAUSE",
            5,
            Assoc::None,
            first(vec![
                seq(vec![ch('&'), label(FOLLOWED_BY, ident("CLAUSE"))]),
                seq(vec![ch('!'), label(NOT_FOLLOWED_BY, ident("CLAUSE"))]),
            ]),
        ),
        prec_rule(
            "CLAUSE",
            4,
            Assoc::None,
            seq(vec![label(OPTIONAL, ident("CLAUSE")), ident("WSC"), ch('?')]),
        ),
        prec_rule(
            "CLAUSE",
            3,
            Assoc::None,
            label(
                LABEL,
                seq(vec![
                    label(LABEL_NAME, ident("IDENT")),
                    ident("WSC"),
                    ch(':'),
                    ident("WSC"),
                    label(LABEL_CLAUSE, ident("CLAUSE")),
                    ident("WSC"),
                ]),
            ),
        ),
        prec_rule(
            "CLAUSE",
            2,
            Assoc::None,
            label(
                SEQ,
                seq(vec![
                    ident("CLAUSE"),
                    ident("WSC"),
                    one_or_more(seq(vec![ident("CLAUSE"), ident("WSC")])),
                ]),
            ),
        ),
        prec_rule(
            "CLAUSE",
            1,
            Assoc::None,
            label(
                FIRST,
                seq(vec![
                    ident("CLAUSE"),
                    ident("WSC"),
                    one_or_more(seq(vec![
                        ch('/'),
                        ident("WSC"),
                        ident("CLAUSE"),
                        ident("WSC"),
                    ])),
                ]),
            ),
        ),
        rule(
            "WSC",
            zero_or_more(first(vec![
                Expr::CharSet(CharSet::of(" \n\r\t")),
                ident("COMMENT"),
            ])),
        ),
        rule(
            "COMMENT",
            seq(vec![
                ch('#'),
                zero_or_more(Expr::CharSet(CharSet::of("\n").negated())),
            ]),
        ),
        rule(
            "IDENT",
            label(
                IDENT,
                seq(vec![
                    ident("NAME_CHAR"),
                    zero_or_more(first(vec![ident("NAME_CHAR"), char_range('0', '9')])),
                ]),
            ),
        ),
        rule("NUM", one_or_more(char_range('0', '9'))),
        rule(
            "NAME_CHAR",
            Expr::CharSet(CharSet::of("_-").with_range('a', 'z').with_range('A', 'Z')),
        ),
        rule(
            "PREC",
            seq(vec![
                ch('['),
                ident("WSC"),
                label(PREC, ident("NUM")),
                ident("WSC"),
                optional(seq(vec![
                    ch(','),
                    ident("WSC"),
                    first(vec![
                        label(R_ASSOC, Expr::CharSet(CharSet::of("rR"))),
                        label(L_ASSOC, Expr::CharSet(CharSet::of("lL"))),
                    ]),
                    ident("WSC"),
                ])),
                ch(']'),
                ident("WSC"),
            ]),
        ),
        rule(
            "QUOTED_STRING",
            seq(vec![
                ch('"'),
                label(STR, zero_or_more(ident("STR_QUOTED_CHAR"))),
                ch('"'),
            ]),
        ),
        rule(
            "STR_QUOTED_CHAR",
            first(vec![
                ident("ESCAPED_CTRL_CHAR"),
                Expr::CharSet(CharSet::of("\"\\").negated()),
            ]),
        ),
        rule(
            "CHAR_SET",
            first(vec![
                seq(vec![
                    ch('\''),
                    label(QUOTED_CHAR, ident("SINGLE_QUOTED_CHAR")),
                    ch('\''),
                ]),
                seq(vec![
                    ch('['),
                    label(
                        CHAR_RANGE,
                        seq(vec![
                            optional(ch('^')),
                            one_or_more(first(vec![
                                ident("CHAR_RANGE_SPAN"),
                                ident("CHAR_RANGE_CHAR"),
                            ])),
                        ]),
                    ),
                    ch(']'),
                ]),
            ]),
        ),
        rule(
            "SINGLE_QUOTED_CHAR",
            first(vec![
                ident("ESCAPED_CTRL_CHAR"),
                Expr::CharSet(CharSet::of("'\\").negated()),
            ]),
        ),
        rule(
            "CHAR_RANGE_SPAN",
            seq(vec![
                ident("CHAR_RANGE_CHAR"),
                ch('-'),
                ident("CHAR_RANGE_CHAR"),
            ]),
        ),
        rule(
            "CHAR_RANGE_CHAR",
            first(vec![
                Expr::CharSet(CharSet::of("\\]").negated()),
                ident("ESCAPED_CTRL_CHAR"),
                lit("\\-"),
                lit("\\\\"),
                lit("\\]"),
                lit("\\^"),
            ]),
        ),
        rule(
            "ESCAPED_CTRL_CHAR",
            first(vec![
                lit("\\t"),
                lit("\\b"),
                lit("\\n"),
                lit("\\r"),
                lit("\\f"),
                lit("\\'"),
                lit("\\\""),
                lit("\\\\"),
            ]),
        ),
        rule(
            "NOTHING",
            label(NOTHING, seq(vec![ch('('), ident("WSC"), ch(')')])),
        ),
        rule("ANYCHAR", label(ANY, ch('.'))),
    ])
    .expect("the meta-grammar is well-formed")
});

/// Parses grammar text into rules, ready for [`Grammar::compile`].
pub fn parse_rules(text: &str) -> Result<Vec<ast::Rule>, GrammarParseError> {
    let grammar: &Grammar = &META_GRAMMAR;
    let memo = grammar.parse(text);

    let top = memo
        .navigable_matches_for_rule("GRAMMAR")
        .expect("GRAMMAR rule exists")
        .get(&0)
        .cloned();
    let top = match top {
        Some(m) if m.len() == text.len() => m,
        _ => {
            // Report whatever the rule layer failed to tile.
            let mut errors: Vec<SyntaxErrorSpan> = memo
                .syntax_errors(&["RULE"])
                .expect("RULE rule exists")
                .into_iter()
                .map(|(start, (end, span))| SyntaxErrorSpan {
                    start,
                    end,
                    text: span.to_owned(),
                })
                .collect();
            if errors.is_empty() {
                errors.push(SyntaxErrorSpan {
                    start: 0,
                    end: text.len(),
                    text: text.to_owned(),
                });
            }
            return Err(GrammarParseError::Syntax { errors });
        }
    };

    let root = AstNode::from_match(grammar, &top, "GRAMMAR");
    root.children
        .iter()
        .map(|rule_node| convert_rule(rule_node, text))
        .collect()
}

/// Parses grammar text and compiles it in one step.
pub fn compile_grammar(text: &str) -> Result<Grammar, GrammarParseError> {
    Grammar::compile(parse_rules(text)?).map_err(GrammarParseError::Grammar)
}

fn convert_rule(node: &AstNode, text: &str) -> Result<ast::Rule, GrammarParseError> {
    debug_assert_eq!(node.label, RULE);
    let (name_node, rest) = match node.children.split_first() {
        Some((name, rest)) if name.label == IDENT && !rest.is_empty() => (name, rest),
        _ => return Err(invalid("malformed rule", node, text)),
    };
    let (clause_node, modifiers) = rest.split_last().expect("rest is non-empty");

    let mut precedence = 0;
    let mut assoc = Assoc::None;
    for modifier in modifiers {
        match modifier.label.as_str() {
            PREC => {
                precedence = modifier
                    .text(text)
                    .parse()
                    .map_err(|_| invalid("precedence out of range", modifier, text))?;
            }
            L_ASSOC => assoc = Assoc::Left,
            R_ASSOC => assoc = Assoc::Right,
            _ => return Err(invalid("malformed rule", modifier, text)),
        }
    }

    Ok(prec_rule(
        name_node.text(text),
        precedence,
        assoc,
        convert_clause(clause_node, text)?,
    ))
}

fn convert_clause(node: &AstNode, text: &str) -> Result<Expr, GrammarParseError> {
    match node.label.as_str() {
        SEQ => Ok(Expr::Seq(convert_clauses(&node.children, text)?)),
        FIRST => Ok(Expr::First(convert_clauses(&node.children, text)?)),
        ONE_OR_MORE => Ok(one_or_more(only_child(node, text)?)),
        ZERO_OR_MORE => Ok(zero_or_more(only_child(node, text)?)),
        OPTIONAL => Ok(optional(only_child(node, text)?)),
        FOLLOWED_BY => Ok(Expr::FollowedBy(Box::new(only_child(node, text)?))),
        NOT_FOLLOWED_BY => Ok(Expr::NotFollowedBy(Box::new(only_child(node, text)?))),
        LABEL => match node.children.as_slice() {
            [name, clause] if name.label == LABEL_NAME && clause.label == LABEL_CLAUSE => {
                Ok(label(name.text(text), only_child(clause, text)?))
            }
            _ => Err(invalid("malformed label", node, text)),
        },
        IDENT => Ok(ident(node.text(text))),
        STR => Ok(Expr::Str(unescape(node.text(text)))),
        QUOTED_CHAR => {
            let unescaped = unescape(node.text(text));
            let mut chars = unescaped.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(ch(c)),
                _ => Err(invalid("expected a single character", node, text)),
            }
        }
        CHAR_RANGE => Ok(Expr::CharSet(parse_char_set(node, text)?)),
        NOTHING => Ok(Expr::Nothing),
        ANY => Ok(Expr::Any),
        _ => Err(invalid("unexpected clause", node, text)),
    }
}

fn only_child(node: &AstNode, text: &str) -> Result<Expr, GrammarParseError> {
    match node.children.as_slice() {
        [child] => convert_clause(child, text),
        _ => Err(invalid("expected a single sub-clause", node, text)),
    }
}

fn convert_clauses(nodes: &[AstNode], text: &str) -> Result<Vec<Expr>, GrammarParseError> {
    nodes.iter().map(|node| convert_clause(node, text)).collect()
}

fn parse_char_set(node: &AstNode, text: &str) -> Result<CharSet, GrammarParseError> {
    let mut body = node.text(text);
    let negated = body.starts_with('^');
    if negated {
        body = &body[1..];
    }

    let mut singles = String::new();
    let mut ranges = vec![];
    let mut pending: Option<char> = None;
    let mut chars = body.chars().peekable();
    while let Some(&next) = chars.peek() {
        if next == '-' && pending.is_some() {
            chars.next();
            match read_set_char(&mut chars) {
                // A trailing dash is a literal.
                None => {
                    singles.push(pending.take().expect("pending was checked"));
                    singles.push('-');
                }
                Some(hi) => ranges.push((pending.take().expect("pending was checked"), hi)),
            }
        } else {
            if let Some(prev) = pending.take() {
                singles.push(prev);
            }
            pending = Some(
                read_set_char(&mut chars)
                    .ok_or_else(|| invalid("malformed character set", node, text))?,
            );
        }
    }
    if let Some(prev) = pending {
        singles.push(prev);
    }

    let mut set = CharSet::of(&singles);
    for (lo, hi) in ranges {
        set = set.with_range(lo, hi);
    }
    Ok(if negated { set.negated() } else { set })
}

fn read_set_char(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    match chars.next()? {
        '\\' => chars.next().map(decode_escape),
        c => Some(c),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(decode_escape(escaped));
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn decode_escape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        c => c,
    }
}

fn invalid(message: &str, node: &AstNode, text: &str) -> GrammarParseError {
    GrammarParseError::Invalid {
        message: format!("{}: {:?}", message, node.text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pika::ast::{not_followed_by, Rule};
    use pretty_assertions::assert_eq;

    fn parsed(text: &str) -> Vec<Rule> {
        parse_rules(text).unwrap()
    }

    #[test]
    fn parses_a_minimal_rule() {
        assert_eq!(parsed("A <- 'a' ;"), vec![rule("A", ch('a'))]);
    }

    #[test]
    fn parses_sequences_and_choices() {
        assert_eq!(
            parsed("A <- 'a' B / C 'd' ;"),
            vec![rule(
                "A",
                first(vec![
                    seq(vec![ch('a'), ident("B")]),
                    seq(vec![ident("C"), ch('d')]),
                ])
            )]
        );
    }

    #[test]
    fn parses_postfix_and_prefix_operators() {
        assert_eq!(
            parsed("A <- !'x' 'a'+ B* C? &'y' ;"),
            vec![rule(
                "A",
                seq(vec![
                    not_followed_by(ch('x')),
                    one_or_more(ch('a')),
                    zero_or_more(ident("B")),
                    optional(ident("C")),
                    Expr::FollowedBy(Box::new(ch('y'))),
                ])
            )]
        );
    }

    #[test]
    fn parses_grouping() {
        assert_eq!(
            parsed("A <- ('a' / 'b')+ ;"),
            vec![rule("A", one_or_more(first(vec![ch('a'), ch('b')])))]
        );
    }

    #[test]
    fn parses_char_sets() {
        assert_eq!(
            parsed("A <- [a-z0-9_] ;"),
            vec![rule(
                "A",
                Expr::CharSet(CharSet::of("_").with_range('a', 'z').with_range('0', '9')),
            )]
        );
        assert_eq!(
            parsed("A <- [^\"\\\\] ;"),
            vec![rule("A", Expr::CharSet(CharSet::of("\"\\").negated()))]
        );
    }

    #[test]
    fn parses_string_literals_with_escapes() {
        assert_eq!(parsed("A <- \"let\\n\" ;"), vec![rule("A", lit("let\n"))]);
        assert_eq!(parsed("A <- \"\" ;"), vec![rule("A", lit(""))]);
    }

    #[test]
    fn parses_precedence_and_associativity() {
        assert_eq!(
            parsed("E[0,L] <- E '+' E ; E[1] <- [0-9] ;"),
            vec![
                prec_rule(
                    "E",
                    0,
                    Assoc::Left,
                    seq(vec![ident("E"), ch('+'), ident("E")])
                ),
                prec_rule("E", 1, Assoc::None, char_range('0', '9')),
            ]
        );
    }

    #[test]
    fn parses_labels_nothing_and_any() {
        assert_eq!(
            parsed("A <- op:('+' / ()) rest:. ;"),
            vec![rule(
                "A",
                seq(vec![
                    label("op", first(vec![ch('+'), Expr::Nothing])),
                    label("rest", Expr::Any),
                ])
            )]
        );
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let text = "# statement grammar\nA <- 'a' ; # trailing\nB <- 'b' ;\n";
        assert_eq!(parsed(text), vec![rule("A", ch('a')), rule("B", ch('b'))]);
    }

    #[test]
    fn reports_unparseable_spans() {
        let err = parse_rules("A <- 'a' ; %%% B <- 'b' ;").unwrap_err();
        match err {
            GrammarParseError::Syntax { errors } => {
                assert!(errors.iter().any(|span| span.text.contains("%%%")));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn compiles_end_to_end() {
        let grammar =
            compile_grammar("Program <- Statement+ ; Statement <- [a-z]+ '=' [0-9]+ ';' ;")
                .unwrap();
        let memo = grammar.parse("x=1;y=2;");
        assert_eq!(
            memo.non_overlapping_matches_for_rule("Statement")
                .unwrap()
                .len(),
            2
        );
        assert!(memo.syntax_errors(&["Program"]).unwrap().is_empty());
    }
}
