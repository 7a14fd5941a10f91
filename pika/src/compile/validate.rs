// pika. The Bottom-Up Parser
// Copyright (c) 2026 the pika project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Upfront checks on the rule list, before any rewriting.

use std::collections::HashSet;

use crate::ast::{Expr, Rule};
use crate::error::Error;

pub(crate) fn check(rules: &[Rule]) -> Result<(), Error> {
    if rules.is_empty() {
        return Err(Error::EmptyGrammar);
    }

    let mut seen = HashSet::new();
    for rule in rules {
        if rule.name.is_empty() {
            return Err(Error::UnnamedRule);
        }
        if matches!(&rule.expr, Expr::Ident(name) if *name == rule.name) {
            return Err(Error::SelfOnlyRule {
                name: rule.name.clone(),
            });
        }
        if !seen.insert((rule.name.as_str(), rule.precedence)) {
            return Err(Error::DuplicatePrecedenceLevel {
                name: rule.name.clone(),
                precedence: rule.precedence,
            });
        }
        check_labels(&rule.expr, &rule.name)?;
    }
    Ok(())
}

fn check_labels(expr: &Expr, rule_name: &str) -> Result<(), Error> {
    if matches!(expr, Expr::Label(name, _) if name.is_empty()) {
        return Err(Error::MissingLabel {
            name: rule_name.to_owned(),
        });
    }
    for child in expr.children() {
        check_labels(child, rule_name)?;
    }
    Ok(())
}
