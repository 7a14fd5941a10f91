// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use criterion::{criterion_group, criterion_main, Criterion};

use pika::ast::{ch, char_range, ident, one_or_more, rule, seq, Rule};
use pika::Grammar;

fn statement_rules() -> Vec<Rule> {
    vec![
        rule("Program", one_or_more(ident("Statement"))),
        rule(
            "Statement",
            seq(vec![
                one_or_more(char_range('a', 'z')),
                ch('='),
                one_or_more(char_range('0', '9')),
                ch(';'),
            ]),
        ),
    ]
}

fn criterion_benchmark(c: &mut Criterion) {
    let grammar = Grammar::compile(statement_rules()).unwrap();
    let input: String = (0..1_000)
        .map(|i| format!("{}={};", (b'a' + (i % 26) as u8) as char, i))
        .collect();

    c.bench_function("compile statement grammar", |b| {
        b.iter(|| Grammar::compile(statement_rules()).unwrap())
    });

    c.bench_function("parse statement list", |b| {
        b.iter(|| grammar.parse(&input))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
