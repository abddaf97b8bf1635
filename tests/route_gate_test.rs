// ABOUTME: Integration tests for the route gate and permitted-role table
// ABOUTME: Validates render, loading, redirect and deny decisions plus the dashboard menu
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::cell::Cell;
use std::sync::Arc;

use contest_hub::constants::routes;
use contest_hub::gate::{
    Access, GateDecision, GateState, Mount, Redirect, RouteGate, RouteRule, RouteTable,
};
use contest_hub::models::{Identity, Role, RoleSet};
use contest_hub::roles::{RoleResolver, RoleState};
use contest_hub::session::{SessionPhase, SessionSnapshot};
use contest_hub::task::Generation;
use helpers::fakes::{identity, FixedRoles};
use serde_json::json;

const SIGNED_IN_AT: Generation = Generation::INITIAL.next();

fn signed_in(identity: &Identity) -> SessionSnapshot {
    SessionSnapshot {
        revision: SIGNED_IN_AT,
        phase: SessionPhase::SignedIn(Arc::new(identity.clone())),
    }
}

fn phase(phase: SessionPhase) -> SessionSnapshot {
    SessionSnapshot {
        revision: Generation::INITIAL.next(),
        phase,
    }
}

/// Role state after resolving `identity` against `roles`
async fn resolved(identity: &Identity, roles: &[(&str, Role)]) -> RoleState {
    let resolver = RoleResolver::new(Arc::new(FixedRoles::new(roles)));
    resolver.resolve_in_session(identity, SIGNED_IN_AT).await;
    resolver.snapshot()
}

fn pending(identity: &Identity) -> RoleState {
    let resolver = RoleResolver::new(Arc::new(FixedRoles::new(&[])));
    resolver.invalidate_session(&signed_in(identity));
    resolver.snapshot()
}

fn idle() -> RoleState {
    RoleResolver::new(Arc::new(FixedRoles::new(&[]))).snapshot()
}

#[tokio::test]
async fn test_public_routes_render_in_every_phase() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    for session in [
        phase(SessionPhase::Restoring),
        phase(SessionPhase::SignedOut),
        signed_in(&ada),
    ] {
        for path in [routes::HOME, routes::CONTESTS, routes::LEADERBOARD, "/about"] {
            assert_eq!(gate.decide(path, &session, &pending(&ada)), GateDecision::Render);
        }
    }
}

#[tokio::test]
async fn test_protected_route_waits_for_restore() {
    let gate = RouteGate::default();
    let session = phase(SessionPhase::Restoring);
    assert_eq!(gate.evaluate(routes::DASHBOARD, &session, &idle()), GateState::Checking);
    assert_eq!(gate.decide(routes::MANAGE_USERS, &session, &idle()), GateDecision::Loading);
}

#[tokio::test]
async fn test_signed_out_redirects_with_return_path() {
    let gate = RouteGate::default();
    let session = phase(SessionPhase::SignedOut);

    let decision = gate.decide("/dashboard/my-participated", &session, &idle());
    let GateDecision::Redirect(redirect) = decision else {
        panic!("expected redirect, got {decision:?}");
    };
    assert_eq!(redirect.to, routes::SIGN_IN);
    assert_eq!(redirect.from, "/dashboard/my-participated");
    assert_eq!(redirect.location(), "/login?from=%2Fdashboard%2Fmy-participated");
}

#[tokio::test]
async fn test_protected_route_waits_for_role() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let session = signed_in(&ada);

    assert_eq!(gate.decide(routes::DASHBOARD, &session, &pending(&ada)), GateDecision::Loading);
    assert_eq!(
        gate.decide(routes::MANAGE_CONTESTS, &session, &pending(&ada)),
        GateDecision::Loading
    );
}

#[tokio::test]
async fn test_role_restricted_routes() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let session = signed_in(&ada);
    let as_user = resolved(&ada, &[("ada", Role::User)]).await;
    let as_creator = resolved(&ada, &[("ada", Role::Creator)]).await;
    let as_admin = resolved(&ada, &[("ada", Role::Admin)]).await;

    let denied = GateDecision::Deny {
        landing: routes::DASHBOARD.to_owned(),
    };
    assert_eq!(gate.decide(routes::MANAGE_USERS, &session, &as_user), denied);
    assert_eq!(gate.decide(routes::MANAGE_USERS, &session, &as_admin), GateDecision::Render);
    assert_eq!(gate.decide(routes::ADD_CONTEST, &session, &as_creator), GateDecision::Render);
    assert_eq!(gate.decide(routes::ADD_CONTEST, &session, &as_admin), denied);
    assert_eq!(gate.decide("/dashboard/edit-contest/7", &session, &as_creator), GateDecision::Render);
    assert_eq!(gate.decide(routes::MY_WINNING, &session, &as_user), GateDecision::Render);
    assert_eq!(gate.decide(routes::MY_WINNING, &session, &as_creator), denied);
    assert_eq!(gate.decide("/contests/42", &session, &as_admin), GateDecision::Render);
}

#[tokio::test]
async fn test_failed_role_is_least_privilege() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let session = signed_in(&ada);
    // Unknown email: the lookup fails
    let failed = resolved(&ada, &[]).await;

    assert_eq!(gate.evaluate(routes::MANAGE_USERS, &session, &failed), GateState::Forbidden);
    assert_eq!(gate.evaluate(routes::MY_PARTICIPATED, &session, &failed), GateState::Forbidden);
    assert_eq!(gate.evaluate(routes::DASHBOARD_PROFILE, &session, &failed), GateState::Authorized);
}

#[tokio::test]
async fn test_previous_identity_role_is_never_used() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let grace = identity("grace", "t");
    let ada_admin = resolved(&ada, &[("ada", Role::Admin)]).await;

    let decision = gate.decide(routes::MANAGE_USERS, &signed_in(&grace), &ada_admin);
    assert_eq!(decision, GateDecision::Loading);
    assert!(gate.navigation(&signed_in(&grace), &ada_admin)
        .iter()
        .all(|entry| entry.path != routes::MANAGE_USERS));
}

#[tokio::test]
async fn test_role_from_earlier_sign_in_is_never_used() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let ada_admin = resolved(&ada, &[("ada", Role::Admin)]).await;

    // Same account, signed out and back in
    let again = SessionSnapshot {
        revision: SIGNED_IN_AT.next().next(),
        phase: SessionPhase::SignedIn(Arc::new(ada.clone())),
    };
    assert_eq!(gate.decide(routes::MANAGE_USERS, &again, &ada_admin), GateDecision::Loading);
    assert_eq!(gate.navigation(&again, &ada_admin).len(), 1);
    assert_eq!(
        gate.decide(routes::MANAGE_USERS, &signed_in(&ada), &ada_admin),
        GateDecision::Render
    );
}

#[tokio::test]
async fn test_mount_renders_only_when_authorized() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let renders = Cell::new(0);
    let render = || {
        renders.set(renders.get() + 1);
        "manage users"
    };

    let session = signed_in(&ada);
    let as_user = resolved(&ada, &[("ada", Role::User)]).await;
    let as_admin = resolved(&ada, &[("ada", Role::Admin)]).await;

    assert_eq!(
        gate.mount(routes::MANAGE_USERS, &phase(SessionPhase::Restoring), &idle(), render),
        Mount::Loading
    );
    assert_eq!(
        gate.mount(routes::MANAGE_USERS, &phase(SessionPhase::SignedOut), &idle(), render),
        Mount::Redirect(Redirect::to_sign_in(routes::MANAGE_USERS))
    );
    assert_eq!(
        gate.mount(routes::MANAGE_USERS, &session, &pending(&ada), render),
        Mount::Loading
    );
    assert!(gate
        .mount(routes::MANAGE_USERS, &session, &as_user, render)
        .content()
        .is_none());
    assert_eq!(renders.get(), 0);

    let mounted = gate.mount(routes::MANAGE_USERS, &session, &as_admin, render);
    assert_eq!(mounted.content(), Some("manage users"));
    assert_eq!(renders.get(), 1);
}

#[tokio::test]
async fn test_dashboard_menu_follows_role() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let session = signed_in(&ada);
    let labels = |state: &RoleState| -> Vec<&'static str> {
        gate.navigation(&session, state)
            .into_iter()
            .map(|entry| entry.label)
            .collect()
    };

    assert_eq!(
        labels(&resolved(&ada, &[("ada", Role::User)]).await),
        ["My Profile", "My Participated Contests", "My Winning Contests"]
    );
    assert_eq!(
        labels(&resolved(&ada, &[("ada", Role::Creator)]).await),
        ["My Profile", "Add Contest", "My Created Contests"]
    );
    assert_eq!(
        labels(&resolved(&ada, &[("ada", Role::Admin)]).await),
        ["My Profile", "Manage Users", "Manage Contests"]
    );
    assert_eq!(labels(&pending(&ada)), ["My Profile"]);
    assert!(gate
        .navigation(&phase(SessionPhase::SignedOut), &idle())
        .is_empty());
}

#[tokio::test]
async fn test_custom_route_table() {
    let gate = RouteGate::new(RouteTable::new(vec![
        RouteRule {
            pattern: "/reports/:year/*",
            access: Access::Roles(RoleSet::ADMIN | RoleSet::CREATOR),
            menu: Some("Reports"),
        },
        RouteRule {
            pattern: "/reports",
            access: Access::Authenticated,
            menu: None,
        },
    ]));
    let ada = identity("ada", "t");
    let session = signed_in(&ada);
    let as_creator = resolved(&ada, &[("ada", Role::Creator)]).await;
    let as_user = resolved(&ada, &[("ada", Role::User)]).await;

    assert_eq!(gate.decide("/reports/2025/q1/summary", &session, &as_creator), GateDecision::Render);
    assert_eq!(gate.evaluate("/reports/2025/q1", &session, &as_user), GateState::Forbidden);
    assert_eq!(gate.evaluate("/reports/", &session, &as_user), GateState::Authorized);
    assert_eq!(gate.evaluate("/dashboard", &session, &as_user), GateState::Authorized);
}

#[tokio::test]
async fn test_decision_serializes_with_action_tag() {
    let redirect = GateDecision::Redirect(Redirect::to_sign_in("/payment/9"));
    assert_eq!(
        serde_json::to_value(&redirect).unwrap(),
        json!({ "action": "redirect", "to": "/login", "from": "/payment/9" })
    );
    assert_eq!(
        serde_json::to_value(GateDecision::Loading).unwrap(),
        json!({ "action": "loading" })
    );
    assert_eq!(GateState::from(redirect), GateState::Unauthenticated);
    assert_eq!(GateState::Forbidden.to_string(), "forbidden");
}

#[tokio::test]
async fn test_spelling_variants_of_admin_route_are_denied() {
    let gate = RouteGate::default();
    let ada = identity("ada", "t");
    let session = signed_in(&ada);
    let as_user = resolved(&ada, &[("ada", Role::User)]).await;

    for path in [
        "/Dashboard/Manage-Users",
        "/contests/../dashboard/manage-users",
        "/./dashboard/manage-users",
        "/dashboard//manage-users/",
    ] {
        assert!(
            matches!(gate.decide(path, &session, &as_user), GateDecision::Deny { .. }),
            "{path}"
        );
        assert!(matches!(
            gate.decide(path, &phase(SessionPhase::SignedOut), &idle()),
            GateDecision::Redirect(_)
        ));
    }
}
