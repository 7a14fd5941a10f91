// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::rc::Rc;

use pika::ast::{ch, first, ident, one_or_more, rule, seq};
use pika::{Grammar, Match};

#[test]
fn one_or_more_builds_right_recursive_spine() {
    let grammar = Grammar::compile(vec![rule("S", one_or_more(ch('a')))]).unwrap();
    let memo = grammar.parse("aaaa");

    let matches = memo.non_overlapping_matches_for_rule("S").unwrap();
    assert_eq!(matches.len(), 1);
    let top = Rc::clone(&matches[0]);
    assert_eq!(top.start(), 0);
    assert_eq!(top.len(), 4);

    // The spine is (head, tail) pairs, one level per repetition.
    let mut depth = 0;
    let mut link: Rc<Match> = top;
    loop {
        depth += 1;
        let head = &link.sub_matches()[0];
        assert_eq!(head.len(), 1, "each head consumes one character");
        match link.sub_matches().get(1) {
            Some(tail) => {
                let tail = Rc::clone(tail);
                link = tail;
            }
            None => break,
        }
    }
    assert_eq!(depth, 4);
}

#[test]
fn every_suffix_position_is_memoized() {
    let grammar = Grammar::compile(vec![rule("S", one_or_more(ch('a')))]).unwrap();
    let memo = grammar.parse("aaaa");

    let navigable = memo.navigable_matches_for_rule("S").unwrap();
    assert_eq!(navigable.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    for (start, m) in navigable {
        assert_eq!(m.len(), 4 - start, "each suffix matches to the end");
    }
}

#[test]
fn right_recursion_matches_without_rewrite() {
    // A <- 'a' A / 'a' consumes the whole input through its recursive
    // alternative.
    let grammar = Grammar::compile(vec![rule(
        "A",
        first(vec![seq(vec![ch('a'), ident("A")]), ch('a')]),
    )])
    .unwrap();
    let memo = grammar.parse("aaa");

    let top = Rc::clone(&memo.navigable_matches_for_rule("A").unwrap()[&0]);
    assert_eq!(top.len(), 3);
    assert_eq!(
        top.first_matching_sub_clause(),
        0,
        "the recursive alternative wins at the start"
    );

    // The spine leans right: 'a' A, with A shrinking by one each level.
    let seq_match = &top.sub_matches()[0];
    assert_eq!(memo.match_text(seq_match), "aaa");
    let inner = &seq_match.sub_matches()[1];
    assert_eq!(memo.match_text(inner), "aa");
    assert_eq!(inner.first_matching_sub_clause(), 0);
    let innermost = &inner.sub_matches()[0].sub_matches()[1];
    assert_eq!(memo.match_text(innermost), "a");
    assert_eq!(
        innermost.first_matching_sub_clause(),
        1,
        "the last character takes the non-recursive alternative"
    );
}
