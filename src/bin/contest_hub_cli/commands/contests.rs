// ABOUTME: Contest browsing commands for contest-hub
// ABOUTME: Lists approved contests and shows contest details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use contest_hub::{
    api::ContestQuery, constants::routes, context::ClientContext, errors::AppResult,
    gate::GateDecision,
};

use crate::helpers::display::{describe_decision, display_contest, display_contest_row};

/// List approved contests, optionally filtered by a search term
pub async fn list(context: &ClientContext, search: Option<String>) -> AppResult<()> {
    let query = ContestQuery {
        search,
        contest_type: None,
    };
    let contests = context.api().contests().list(&query).await?;
    if contests.is_empty() {
        println!("No contests found.");
        return Ok(());
    }

    println!(
        "{:<26} {:<32} {:<18} {:>8} {:>6}  DEADLINE",
        "ID", "NAME", "TYPE", "FEE", "JOINED"
    );
    for contest in &contests {
        display_contest_row(contest);
    }
    Ok(())
}

/// Show one contest; the detail route requires sign-in
pub async fn show(context: &ClientContext, id: &str) -> AppResult<()> {
    let path = routes::CONTEST_DETAIL.replace(":id", id);
    let decision = context.settle(&path).await;
    if decision != GateDecision::Render {
        println!("{path}: {}", describe_decision(&decision));
        return Ok(());
    }

    let contest = context.api().contests().get(id).await?;
    display_contest(&contest);
    Ok(())
}
