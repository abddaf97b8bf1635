// ABOUTME: Composed client context with startup wiring, role synchronization and teardown
// ABOUTME: Keeps the role resolver in step with session transitions on a background task
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info};

use crate::api::{ContestsApi, PaymentsApi, SubmissionsApi, UserRegistrar, UsersApi};
use crate::config::{ClientConfig, PaymentConfig};
use crate::constants::routes;
use crate::errors::AppResult;
use crate::gate::{GateDecision, NavEntry, RouteGate, RouteTable};
use crate::http::{AuthorizedClient, PublicClient, Transport};
use crate::models::Identity;
use crate::navigator::Navigator;
use crate::notices::NoticeBoard;
use crate::roles::{RoleLookup, RoleResolver};
use crate::session::{
    AuthProvider, CredentialStore, DirectoryRegistrar, FederatedTokenSource, FileCredentialStore,
    FirebaseAuthProvider, SessionSnapshot, SessionStore,
};
use crate::task::Generation;

use super::{ApiContext, AuthContext};

/// Builder wiring a [`ClientContext`] from its collaborators
///
/// Defaults: the role lookup and directory registrar talk to the backend
/// through `transport`; the route table is [`RouteTable::default`].
pub struct ClientContextBuilder {
    provider: Arc<dyn AuthProvider>,
    credentials: Arc<dyn CredentialStore>,
    transport: Transport,
    payment: PaymentConfig,
    role_lookup: Option<Arc<dyn RoleLookup>>,
    registrar: Option<Arc<dyn DirectoryRegistrar>>,
    routes: RouteTable,
    start_path: String,
    notices: NoticeBoard,
}

impl ClientContextBuilder {
    /// Builder over the required collaborators
    #[must_use]
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        credentials: Arc<dyn CredentialStore>,
        transport: Transport,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            provider,
            credentials,
            transport,
            payment,
            role_lookup: None,
            registrar: None,
            routes: RouteTable::default(),
            start_path: routes::HOME.to_owned(),
            notices: NoticeBoard::default(),
        }
    }

    /// Replace the backend role lookup
    #[must_use]
    pub fn role_lookup(mut self, lookup: Arc<dyn RoleLookup>) -> Self {
        self.role_lookup = Some(lookup);
        self
    }

    /// Replace the backend directory registrar
    #[must_use]
    pub fn registrar(mut self, registrar: Arc<dyn DirectoryRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Replace the route table
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Initial location
    #[must_use]
    pub fn start_path(mut self, path: impl Into<String>) -> Self {
        self.start_path = path.into();
        self
    }

    /// Use an existing notice board
    #[must_use]
    pub fn notices(mut self, notices: NoticeBoard) -> Self {
        self.notices = notices;
        self
    }

    /// Wire the context and start role synchronization
    ///
    /// Must run inside a Tokio runtime. The session stays in the restoring
    /// phase until [`ClientContext::restore_session`] runs.
    #[must_use]
    pub fn build(self) -> ClientContext {
        let public = PublicClient::new(self.transport.clone());
        let registrar = self.registrar.unwrap_or_else(|| {
            Arc::new(UserRegistrar::new(public.clone())) as Arc<dyn DirectoryRegistrar>
        });

        let session = Arc::new(
            SessionStore::new(self.provider, self.credentials).with_registrar(registrar),
        );
        let navigator = Arc::new(Navigator::new(&self.start_path));
        let authorized = AuthorizedClient::new(
            self.transport,
            Arc::clone(&session),
            Arc::clone(&navigator),
            self.notices.clone(),
        );

        let users = UsersApi::new(authorized.clone());
        let lookup = self
            .role_lookup
            .unwrap_or_else(|| Arc::new(users.clone()) as Arc<dyn RoleLookup>);
        let roles = Arc::new(RoleResolver::new(lookup));

        let api = ApiContext::new(
            users,
            ContestsApi::new(public, authorized.clone()),
            PaymentsApi::new(authorized.clone(), self.payment),
            SubmissionsApi::new(authorized),
        );
        let auth = AuthContext::new(
            Arc::clone(&session),
            Arc::clone(&roles),
            Arc::new(RouteGate::new(self.routes)),
            navigator,
            self.notices,
        );

        let role_sync = spawn_role_sync(session, roles);
        ClientContext {
            auth,
            api,
            role_sync,
        }
    }
}

/// Explicit client context: session, roles, gate and backend clients
///
/// Dropping the context stops role synchronization and any lookup it started.
pub struct ClientContext {
    auth: AuthContext,
    api: ApiContext,
    role_sync: AbortHandle,
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("session", &self.auth.session().snapshot())
            .field("roles", &self.auth.roles().snapshot())
            .finish_non_exhaustive()
    }
}

impl ClientContext {
    /// Wire the production collaborators from `config` and restore any
    /// persisted session
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if the HTTP client cannot be built
    pub async fn init(config: &ClientConfig) -> AppResult<Self> {
        Self::init_with_federated(config, None).await
    }

    /// Like [`ClientContext::init`], with a source for federated sign-in
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if the HTTP client cannot be built
    pub async fn init_with_federated(
        config: &ClientConfig,
        federated: Option<Arc<dyn FederatedTokenSource>>,
    ) -> AppResult<Self> {
        let transport = Transport::new(&config.backend)?;
        let mut provider =
            FirebaseAuthProvider::new(config.firebase.clone(), transport.client().clone());
        if let Some(source) = federated {
            provider = provider.with_federated_source(source);
        }

        let context = ClientContextBuilder::new(
            Arc::new(provider),
            Arc::new(FileCredentialStore::new(&config.session_file)),
            transport,
            config.payment.clone(),
        )
        .build();

        context.restore_session().await;
        info!(environment = %config.environment, "Client context ready");
        Ok(context)
    }

    /// Authentication context
    #[must_use]
    pub const fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Backend clients
    #[must_use]
    pub const fn api(&self) -> &ApiContext {
        &self.api
    }

    /// Run the one-time session restore
    pub async fn restore_session(&self) -> SessionSnapshot {
        self.auth.session().restore_session().await
    }

    /// Signed-in identity, if any
    #[must_use]
    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.auth.session().current_identity()
    }

    /// Gate decision for `path` right now
    #[must_use]
    pub fn decide(&self, path: &str) -> GateDecision {
        self.auth.decide(path)
    }

    /// Dashboard menu right now
    #[must_use]
    pub fn navigation(&self) -> Vec<NavEntry> {
        self.auth.navigation()
    }

    /// Wait until the gate leaves the loading state for `path`
    pub async fn settle(&self, path: &str) -> GateDecision {
        let mut session = self.auth.session().subscribe();
        let mut roles = self.auth.roles().subscribe();
        loop {
            session.mark_unchanged();
            roles.mark_unchanged();
            let decision = self.decide(path);
            if decision != GateDecision::Loading {
                return decision;
            }
            let changed = tokio::select! {
                changed = session.changed() => changed,
                changed = roles.changed() => changed,
            };
            if changed.is_err() {
                return decision;
            }
        }
    }

    /// Navigate to `path`, following a sign-in redirect if the gate asks for one
    pub fn navigate(&self, path: &str) -> GateDecision {
        let navigator = self.auth.navigator();
        navigator.navigate(path);
        let decision = self.decide(path);
        if let GateDecision::Redirect(redirect) = &decision {
            navigator.redirect_to_sign_in(&redirect.from);
        }
        decision
    }

    /// Email/password sign-in; returns the path navigated to afterwards
    ///
    /// # Errors
    ///
    /// See [`SessionStore::sign_in`]
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<String> {
        self.auth.session().sign_in(email, password).await?;
        Ok(self.auth.navigator().complete_sign_in())
    }

    /// Federated sign-in; returns the path navigated to afterwards
    ///
    /// # Errors
    ///
    /// See [`SessionStore::sign_in_with_federated_provider`]
    pub async fn sign_in_with_federated_provider(&self) -> AppResult<String> {
        self.auth
            .session()
            .sign_in_with_federated_provider()
            .await?;
        Ok(self.auth.navigator().complete_sign_in())
    }

    /// Sign out, leaving any protected route for the home page
    pub async fn sign_out(&self) {
        self.auth.session().sign_out().await;
        let navigator = self.auth.navigator();
        let current = navigator.current_path();
        if self.auth.gate().table().access_for(&current).is_protected() {
            navigator.navigate(routes::HOME);
        }
    }

    /// Stop role synchronization
    pub fn teardown(&self) {
        if !self.role_sync.is_finished() {
            debug!("Stopping role synchronization");
        }
        self.role_sync.abort();
    }
}

impl Drop for ClientContext {
    fn drop(&mut self) {
        self.role_sync.abort();
    }
}

/// Invalidate the role on every session transition, then resolve it for the
/// new identity; lookups die with the task
fn spawn_role_sync(session: Arc<SessionStore>, roles: Arc<RoleResolver>) -> AbortHandle {
    let mut changes = session.subscribe();
    let task = tokio::spawn(async move {
        let mut lookups = JoinSet::new();
        loop {
            let snapshot = changes.borrow_and_update().clone();
            roles.invalidate_session(&snapshot);
            if let Some(identity) = snapshot.identity() {
                lookups.spawn(resolve_if_current(
                    Arc::clone(&session),
                    Arc::clone(&roles),
                    Arc::clone(identity),
                    snapshot.revision,
                ));
            }

            if !wait_for_change(&mut changes, &mut lookups).await {
                break;
            }
        }
        debug!("Role synchronization stopped");
    });
    task.abort_handle()
}

/// Reap finished lookups until the session changes; false once the store is gone
async fn wait_for_change(
    changes: &mut watch::Receiver<SessionSnapshot>,
    lookups: &mut JoinSet<()>,
) -> bool {
    loop {
        tokio::select! {
            changed = changes.changed() => return changed.is_ok(),
            Some(_) = lookups.join_next(), if !lookups.is_empty() => {}
        }
    }
}

async fn resolve_if_current(
    session: Arc<SessionStore>,
    roles: Arc<RoleResolver>,
    identity: Arc<Identity>,
    revision: Generation,
) {
    let snapshot = session.snapshot();
    let current = snapshot.revision == revision
        && snapshot
            .identity()
            .is_some_and(|current| current.same_account(&identity));
    if current {
        roles.resolve_in_session(&identity, revision).await;
    }
}
