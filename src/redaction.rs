// ABOUTME: PII-safe helpers for log fields carrying emails and bearer tokens
// ABOUTME: Masks email addresses and strips token material before it reaches the logs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Redaction for log output
//!
//! ```rust
//! use contest_hub::redaction::{mask_email, redact_bearer};
//!
//! assert_eq!(mask_email("testuser@domain.com"), "t***@d***.com");
//! assert_eq!(redact_bearer("Bearer abc.def.ghi"), "Bearer [REDACTED]");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Placeholder substituted for secrets
pub const REDACTED: &str = "[REDACTED]";

/// Mask every email address in `text`, keeping the first character of the
/// local part and of the domain label
#[must_use]
pub fn mask_email(text: &str) -> String {
    email_regex().map_or_else(
        || text.to_owned(),
        |regex| {
            regex
                .replace_all(text, |caps: &regex::Captures| {
                    let full_match = &caps[0];
                    full_match.split_once('@').map_or_else(
                        || full_match.to_owned(),
                        |(local, domain)| {
                            format!("{}@{}", mask_segment(local), mask_domain(domain))
                        },
                    )
                })
                .to_string()
        },
    )
}

fn mask_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => format!("{first}***"),
        _ => segment.to_owned(),
    }
}

fn mask_domain(domain: &str) -> String {
    domain.split_once('.').map_or_else(
        || domain.to_owned(),
        |(label, rest)| format!("{}.{rest}", mask_segment(label)),
    )
}

/// Replace bearer tokens in `text` with a placeholder
#[must_use]
pub fn redact_bearer(text: &str) -> String {
    bearer_regex().map_or_else(
        || text.to_owned(),
        |regex| {
            regex
                .replace_all(text, format!("Bearer {REDACTED}"))
                .to_string()
        },
    )
}

/// Short, non-reversible preview of a token for correlation in logs
#[must_use]
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if prefix.is_empty() {
        REDACTED.to_owned()
    } else {
        format!("{prefix}***")
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").ok())
        .as_ref()
}

fn bearer_regex() -> Option<&'static Regex> {
    static BEARER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BEARER_REGEX
        .get_or_init(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").ok())
        .as_ref()
}
