// ABOUTME: Scripted identity provider, role lookups and directory registrar for tests
// ABOUTME: Gates let a test hold an async call in flight and release it on demand

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use contest_hub::errors::{AppError, AppResult};
use contest_hub::models::{Credential, Identity, NewUser, Role};
use contest_hub::roles::RoleLookup;
use contest_hub::session::{
    AuthProvider, CredentialStore, DirectoryRegistrar, MemoryCredentialStore, PersistedSession,
    ProviderSession, Registration,
};
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

/// Identity with a predictable email
pub fn identity(id: &str, token: &str) -> Identity {
    Identity {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        display_name: None,
        photo_url: None,
        credential: Credential::new(token),
    }
}

/// Password provider session for `identity(id, token)`
pub fn provider_session(id: &str, token: &str) -> ProviderSession {
    ProviderSession {
        identity: identity(id, token),
        refresh_token: Some(format!("refresh-{id}")),
        sign_in_provider: "password".to_owned(),
    }
}

/// Persisted record for `identity(id, token)`
pub fn persisted(id: &str, token: &str) -> PersistedSession {
    PersistedSession::from_provider(&provider_session(id, token))
}

/// Holds callers until the test opens it and counts how many arrived
pub struct Gate {
    open: watch::Sender<bool>,
    entered: watch::Sender<usize>,
}

impl Gate {
    pub fn opened() -> Self {
        Self::new(true)
    }

    pub fn closed() -> Self {
        Self::new(false)
    }

    fn new(open: bool) -> Self {
        let (open, _) = watch::channel(open);
        let (entered, _) = watch::channel(0);
        Self { open, entered }
    }

    /// Record arrival and wait until the gate is open
    pub async fn pass(&self) {
        self.entered.send_modify(|count| *count += 1);
        let mut open = self.open.subscribe();
        let _ = open.wait_for(|open| *open).await;
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub fn entered(&self) -> usize {
        *self.entered.borrow()
    }

    /// Wait until at least `count` callers arrived
    pub async fn wait_entered(&self, count: usize) {
        let mut entered = self.entered.subscribe();
        let reached = timeout(WAIT, entered.wait_for(|n| *n >= count))
            .await
            .expect("gate was never reached")
            .is_ok();
        assert!(reached);
    }
}

/// What a scripted restore does with the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Mint a fresh credential for the persisted identity
    Accept,
    /// The provider no longer honors the session
    Reject,
    /// The provider cannot be reached
    Unreachable,
}

/// In-memory identity provider
pub struct ScriptedProvider {
    accounts: Mutex<HashMap<String, (String, String)>>,
    federated: Mutex<Option<ProviderSession>>,
    restore: Mutex<RestoreOutcome>,
    restore_gate: Gate,
    issued: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub restore_calls: AtomicUsize,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            federated: Mutex::new(None),
            restore: Mutex::new(RestoreOutcome::Accept),
            restore_gate: Gate::opened(),
            issued: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            restore_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account `id` signing in as `{id}@example.com` with `password`
    pub fn with_account(self, id: &str, password: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            format!("{id}@example.com"),
            (password.to_owned(), id.to_owned()),
        );
        self
    }

    /// Federated sign-in succeeds as `id`
    pub fn with_federated(self, id: &str) -> Self {
        self.set_federated(Some(id));
        self
    }

    pub fn with_restore(self, outcome: RestoreOutcome) -> Self {
        *self.restore.lock().unwrap() = outcome;
        self
    }

    /// Restore waits on [`ScriptedProvider::restore_gate`]
    pub fn holding_restore(mut self) -> Self {
        self.restore_gate = Gate::closed();
        self
    }

    pub fn set_federated(&self, id: Option<&str>) {
        *self.federated.lock().unwrap() = id.map(|id| ProviderSession {
            identity: Identity {
                display_name: Some(format!("User {id}")),
                ..identity(id, &format!("federated-{id}"))
            },
            refresh_token: None,
            sign_in_provider: "google.com".to_owned(),
        });
    }

    pub const fn restore_gate(&self) -> &Gate {
        &self.restore_gate
    }

    fn next_token(&self, id: &str) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{id}-{n}")
    }
}

#[async_trait]
impl AuthProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<ProviderSession> {
        let account = self.accounts.lock().unwrap().get(email).cloned();
        match account {
            Some((expected, id)) if expected == password => {
                Ok(provider_session(&id, &self.next_token(&id)))
            }
            _ => Err(AppError::invalid_credentials("Email or password is incorrect")),
        }
    }

    async fn sign_in_federated(&self) -> AppResult<ProviderSession> {
        self.federated
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::internal("popup closed by user"))
    }

    async fn restore(&self, persisted: &PersistedSession) -> AppResult<Option<ProviderSession>> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        self.restore_gate.pass().await;
        let outcome = *self.restore.lock().unwrap();
        match outcome {
            RestoreOutcome::Accept => Ok(Some(ProviderSession {
                identity: persisted
                    .identity_with(Credential::new(self.next_token(&persisted.user_id))),
                refresh_token: persisted.refresh_token.clone(),
                sign_in_provider: persisted.sign_in_provider.clone(),
            })),
            RestoreOutcome::Reject => Ok(None),
            RestoreOutcome::Unreachable => Err(AppError::service_unavailable(
                "Scripted provider",
                "connection refused",
            )),
        }
    }

    async fn sign_out(&self, _identity: &Identity) -> AppResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Role lookup answered from a fixed table; unknown emails fail
pub struct FixedRoles {
    roles: HashMap<String, Role>,
    calls: AtomicUsize,
}

impl FixedRoles {
    /// Table keyed by identity id (email `{id}@example.com`)
    pub fn new(entries: &[(&str, Role)]) -> Self {
        Self {
            roles: entries
                .iter()
                .map(|(id, role)| (format!("{id}@example.com"), *role))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleLookup for FixedRoles {
    async fn lookup_role(&self, identity: &Identity) -> AppResult<Role> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.roles
            .get(&identity.email)
            .copied()
            .ok_or_else(|| AppError::role_resolution("no such user"))
    }
}

/// Role lookup the test answers by hand, one pending call at a time
pub struct GatedLookup {
    pending: Mutex<Vec<(String, oneshot::Sender<AppResult<Role>>)>>,
    calls: watch::Sender<usize>,
}

impl Default for GatedLookup {
    fn default() -> Self {
        let (calls, _) = watch::channel(0);
        Self {
            pending: Mutex::new(Vec::new()),
            calls,
        }
    }
}

impl GatedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        let mut calls = self.calls.subscribe();
        let reached = timeout(WAIT, calls.wait_for(|n| *n >= count))
            .await
            .expect("role lookup was never started")
            .is_ok();
        assert!(reached);
    }

    /// Answer the oldest pending lookup for `id`; false if none is waiting
    pub fn respond(&self, id: &str, result: AppResult<Role>) -> bool {
        let email = format!("{id}@example.com");
        let sender = {
            let mut pending = self.pending.lock().unwrap();
            pending
                .iter()
                .position(|(waiting, _)| *waiting == email)
                .map(|index| pending.remove(index).1)
        };
        sender.is_some_and(|sender| sender.send(result).is_ok())
    }
}

#[async_trait]
impl RoleLookup for GatedLookup {
    async fn lookup_role(&self, identity: &Identity) -> AppResult<Role> {
        let (sender, receiver) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .push((identity.email.clone(), sender));
        self.calls.send_modify(|n| *n += 1);
        receiver
            .await
            .unwrap_or_else(|_| Err(AppError::internal("lookup abandoned")))
    }
}

/// Directory registrar remembering every registration
pub struct RecordingRegistrar {
    entries: Mutex<Vec<NewUser>>,
    gate: Gate,
    failing: bool,
}

impl Default for RecordingRegistrar {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            gate: Gate::opened(),
            failing: false,
        }
    }
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations wait on [`RecordingRegistrar::gate`]
    pub fn holding() -> Self {
        Self {
            gate: Gate::closed(),
            ..Self::default()
        }
    }

    /// Every registration fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub const fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn entries(&self) -> Vec<NewUser> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryRegistrar for RecordingRegistrar {
    async fn register(&self, user: &NewUser) -> AppResult<Registration> {
        self.gate.pass().await;
        if self.failing {
            return Err(AppError::service_unavailable("User directory", "down"));
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|entry| entry.email == user.email) {
            return Ok(Registration::AlreadyExists);
        }
        entries.push(user.clone());
        Ok(Registration::Created)
    }
}

/// In-memory credential store whose `clear` waits on a gate
pub struct HeldClearStore {
    inner: MemoryCredentialStore,
    clear_gate: Gate,
}

impl HeldClearStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryCredentialStore::new(),
            clear_gate: Gate::closed(),
        }
    }

    pub const fn clear_gate(&self) -> &Gate {
        &self.clear_gate
    }
}

#[async_trait]
impl CredentialStore for HeldClearStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        self.inner.load().await
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        self.inner.save(session).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.clear_gate.pass().await;
        self.inner.clear().await
    }
}
