// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors
// ABOUTME: Output formatting helpers for contest-hub
// ABOUTME: Provides consistent display of identities, gate decisions and contests

use contest_hub::{
    gate::{Access, GateDecision, NavEntry},
    models::{Contest, Identity, Role},
};

/// Describe an access rule in one short phrase
pub fn describe_access(access: Access) -> String {
    match access {
        Access::Public => "public".to_owned(),
        Access::Authenticated => "signed in".to_owned(),
        Access::Roles(set) => {
            let roles: Vec<&str> = [Role::Admin, Role::Creator, Role::User]
                .into_iter()
                .filter(|role| set.permits(*role))
                .map(Role::as_str)
                .collect();
            format!("role: {}", roles.join(" | "))
        }
    }
}

/// Describe a gate decision in one short phrase
pub fn describe_decision(decision: &GateDecision) -> String {
    match decision {
        GateDecision::Render => "render".to_owned(),
        GateDecision::Loading => "loading".to_owned(),
        GateDecision::Redirect(redirect) => format!("redirect to {}", redirect.location()),
        GateDecision::Deny { landing } => format!("forbidden (landing: {landing})"),
    }
}

/// Display the signed-in identity with its role
pub fn display_identity(identity: &Identity, role: Role) {
    println!("Signed in as {}", identity.label());
    println!("{}", "=".repeat(50));
    println!("   Email: {}", identity.email);
    println!("   User ID: {}", identity.id);
    println!("   Role: {role}");
    if let Some(photo) = &identity.photo_url {
        println!("   Photo: {photo}");
    }
}

/// Display the dashboard menu
pub fn display_navigation(entries: &[NavEntry]) {
    if entries.is_empty() {
        println!("\nDashboard menu: (empty)");
        return;
    }
    println!("\nDashboard menu:");
    for entry in entries {
        println!("   {:<28} {}", entry.label, entry.path);
    }
}

/// Display a one-line contest summary
pub fn display_contest_row(contest: &Contest) {
    println!(
        "{:<26} {:<32} {:<18} {:>8.2} {:>6}  {}",
        contest.id,
        truncate(&contest.name, 32),
        truncate(&contest.contest_type, 18),
        contest.price,
        contest.participation_count,
        contest.deadline.format("%Y-%m-%d")
    );
}

/// Display a contest in full
pub fn display_contest(contest: &Contest) {
    println!("{}", contest.name);
    println!("{}", "=".repeat(60));
    println!("   ID: {}", contest.id);
    println!("   Type: {}", contest.contest_type);
    println!("   Fee: {:.2}", contest.price);
    println!("   Prize: {}", contest.prize);
    println!("   Deadline: {}", contest.deadline.format("%Y-%m-%d %H:%M UTC"));
    println!("   Participants: {}", contest.participation_count);
    println!("   Creator: {}", contest.creator_email);
    if let Some(winner) = &contest.winner {
        println!("   Winner: {} <{}>", winner.name, winner.email);
    }
    println!("\n{}", contest.description);
    if !contest.task_instruction.is_empty() {
        println!("\nTask: {}", contest.task_instruction);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_owned()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
