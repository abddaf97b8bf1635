// ABOUTME: Route gate commands for contest-hub
// ABOUTME: Shows access rules and gate decisions for the signed-in identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use contest_hub::context::ClientContext;

use crate::helpers::display::{describe_access, describe_decision};

/// List every route with its access rule and current decision
pub async fn list(context: &ClientContext) {
    let rules = context.auth().gate().table().rules().to_vec();
    println!("{:<32} {:<20} DECISION", "ROUTE", "ACCESS");
    for rule in rules {
        let decision = context.settle(rule.pattern).await;
        println!(
            "{:<32} {:<20} {}",
            rule.pattern,
            describe_access(rule.access),
            describe_decision(&decision)
        );
    }
}

/// Show the gate decision for one path
pub async fn check(context: &ClientContext, path: &str) {
    let decision = context.settle(path).await;
    let state = context.auth().evaluate(path);
    println!("{path}: {state} -> {}", describe_decision(&decision));
}
