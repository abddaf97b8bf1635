// ABOUTME: Integration tests for role resolution
// ABOUTME: Validates per-identity caching, shared in-flight lookups and stale lookup handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use contest_hub::errors::AppError;
use contest_hub::models::{Credential, Role};
use contest_hub::roles::{RoleResolver, RoleStatus};
use helpers::fakes::{identity, FixedRoles, GatedLookup, WAIT};
use tokio::time::timeout;

#[tokio::test]
async fn test_role_is_looked_up_once_per_identity() {
    let lookup = Arc::new(FixedRoles::new(&[("ada", Role::Admin)]));
    let resolver = RoleResolver::new(Arc::clone(&lookup) as _);
    let ada = identity("ada", "t1");

    assert_eq!(resolver.resolve_role(&ada).await, Role::Admin);
    assert_eq!(resolver.resolve_role(&ada).await, Role::Admin);
    assert_eq!(lookup.calls(), 1);
    assert_eq!(resolver.current_role(Some(&ada)), Role::Admin);
}

#[tokio::test]
async fn test_refreshed_credential_keeps_cached_role() {
    let lookup = Arc::new(FixedRoles::new(&[("ada", Role::Creator)]));
    let resolver = RoleResolver::new(Arc::clone(&lookup) as _);
    resolver.resolve_role(&identity("ada", "t1")).await;

    let refreshed = identity("ada", "t2");
    assert!(!resolver.invalidate(Some(&refreshed)));
    assert_eq!(resolver.resolve_role(&refreshed).await, Role::Creator);
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_lookup() {
    let lookup = Arc::new(GatedLookup::new());
    let resolver = Arc::new(RoleResolver::new(Arc::clone(&lookup) as _));
    let ada = identity("ada", "t");

    let first = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    lookup.wait_for_calls(1).await;
    assert!(resolver.snapshot().in_flight());

    let second = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    tokio::task::yield_now().await;

    assert!(lookup.respond("ada", Ok(Role::User)));
    assert_eq!(first.await.unwrap(), Role::User);
    assert_eq!(second.await.unwrap(), Role::User);
    assert_eq!(lookup.calls(), 1);
    assert!(!resolver.snapshot().in_flight());
}

#[tokio::test]
async fn test_pending_until_lookup_answers() {
    let lookup = Arc::new(GatedLookup::new());
    let resolver = Arc::new(RoleResolver::new(Arc::clone(&lookup) as _));
    let ada = identity("ada", "t");

    let resolving = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    lookup.wait_for_calls(1).await;
    assert_eq!(resolver.snapshot().status_for(Some(&ada)), RoleStatus::Pending);
    assert_eq!(resolver.current_role(Some(&ada)), Role::Unknown);

    lookup.respond("ada", Ok(Role::Admin));
    resolving.await.unwrap();
    assert_eq!(
        resolver.snapshot().status_for(Some(&ada)),
        RoleStatus::Resolved(Role::Admin)
    );
}

#[tokio::test]
async fn test_failed_lookup_is_least_privilege_and_not_retried() {
    let lookup = Arc::new(GatedLookup::new());
    let resolver = Arc::new(RoleResolver::new(Arc::clone(&lookup) as _));
    let ada = identity("ada", "t");

    let resolving = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    lookup.wait_for_calls(1).await;
    lookup.respond("ada", Err(AppError::role_resolution("backend down")));

    assert_eq!(resolving.await.unwrap(), Role::Unknown);
    let state = resolver.snapshot();
    assert_eq!(state.status_for(Some(&ada)), RoleStatus::Failed);
    assert!(state.status_for(Some(&ada)).is_settled());

    assert_eq!(resolver.resolve_role(&ada).await, Role::Unknown);
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_refresh_looks_the_role_up_again() {
    let lookup = Arc::new(FixedRoles::new(&[("ada", Role::User)]));
    let resolver = RoleResolver::new(Arc::clone(&lookup) as _);
    let ada = identity("ada", "t");

    resolver.resolve_role(&ada).await;
    assert_eq!(resolver.refresh(&ada).await, Role::User);
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn test_lookup_for_superseded_identity_is_discarded() {
    let lookup = Arc::new(GatedLookup::new());
    let resolver = Arc::new(RoleResolver::new(Arc::clone(&lookup) as _));
    let ada = identity("ada", "t1");
    let grace = identity("grace", "t2");

    let stale = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    lookup.wait_for_calls(1).await;

    assert!(resolver.invalidate(Some(&grace)));
    assert!(lookup.respond("ada", Ok(Role::Admin)));
    assert_eq!(stale.await.unwrap(), Role::Unknown);

    let state = resolver.snapshot();
    assert_eq!(state.status_for(Some(&grace)), RoleStatus::Pending);
    assert_eq!(state.role_for(Some(&grace)), Role::Unknown);
    // Ada's answer never landed anywhere
    assert_eq!(state.status_for(Some(&ada)), RoleStatus::Pending);
}

#[tokio::test]
async fn test_status_never_leaks_across_identities() {
    let lookup = Arc::new(FixedRoles::new(&[("ada", Role::Admin)]));
    let resolver = RoleResolver::new(Arc::clone(&lookup) as _);
    resolver.resolve_role(&identity("ada", "t")).await;

    let grace = identity("grace", "t");
    assert_eq!(resolver.snapshot().status_for(Some(&grace)), RoleStatus::Pending);
    assert_eq!(resolver.current_role(Some(&grace)), Role::Unknown);
    assert_eq!(resolver.current_role(None), Role::Unknown);
}

#[tokio::test]
async fn test_invalidate_to_nobody_goes_idle() {
    let lookup = Arc::new(FixedRoles::new(&[("ada", Role::Admin)]));
    let resolver = RoleResolver::new(Arc::clone(&lookup) as _);
    let ada = identity("ada", "t");
    resolver.resolve_role(&ada).await;
    let before = resolver.snapshot().generation;

    assert!(resolver.invalidate(None));
    let state = resolver.snapshot();
    assert_eq!(state.identity, None);
    assert_eq!(state.status, RoleStatus::Idle);
    assert!(state.generation > before);
    assert!(!resolver.invalidate(None));
}

#[tokio::test]
async fn test_abandoned_lookup_releases_waiters() {
    let lookup = Arc::new(GatedLookup::new());
    let resolver = Arc::new(RoleResolver::new(Arc::clone(&lookup) as _));
    let ada = identity("ada", "t");

    let owner = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    lookup.wait_for_calls(1).await;
    let waiter = tokio::spawn({
        let (resolver, ada) = (Arc::clone(&resolver), ada.clone());
        async move { resolver.resolve_role(&ada).await }
    });
    tokio::task::yield_now().await;

    owner.abort();
    let role = timeout(WAIT, waiter).await.expect("waiter hung").unwrap();
    assert_eq!(role, Role::Unknown);
    assert!(!resolver.snapshot().in_flight());
}

#[tokio::test]
async fn test_identity_key_ignores_credential() {
    let mut ada = identity("ada", "t1");
    let key = ada.key();
    ada.credential = Credential::new("t2");
    assert_eq!(ada.key(), key);
}
