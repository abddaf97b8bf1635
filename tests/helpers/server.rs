// ABOUTME: Fake contest backend and Firebase Auth REST endpoints served by axum on a random port
// ABOUTME: Issues real bearer tokens so authorized requests, role lookups and refreshes run end to end

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use contest_hub::config::{BackendConfig, ClientConfig, Environment, FirebaseConfig, PaymentConfig};
use contest_hub::models::{Contest, ContestStatus, NewUser, Role};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use url::Url;

/// Web API key the fake identity toolkit accepts
pub const API_KEY: &str = "test-api-key";

#[derive(Clone)]
struct Account {
    local_id: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Default)]
struct ServerState {
    accounts: Mutex<HashMap<String, Account>>,
    idp_tokens: Mutex<HashMap<String, (String, String)>>,
    refresh_tokens: Mutex<HashMap<String, (String, String)>>,
    valid_tokens: Mutex<HashMap<String, String>>,
    directory: Mutex<HashMap<String, Role>>,
    registrations: Mutex<Vec<NewUser>>,
    contests: Mutex<Vec<Contest>>,
    issued: AtomicUsize,
    authorized_requests: AtomicUsize,
}

impl ServerState {
    /// Issue an ID token and refresh token for `(local_id, email)`
    fn issue(&self, local_id: &str, email: &str) -> (String, String) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let id_token = format!("id-token-{n}");
        let refresh_token = format!("refresh-{local_id}-{n}");
        self.valid_tokens
            .lock()
            .unwrap()
            .insert(id_token.clone(), email.to_owned());
        self.refresh_tokens.lock().unwrap().insert(
            refresh_token.clone(),
            (local_id.to_owned(), email.to_owned()),
        );
        (id_token, refresh_token)
    }

    fn caller(&self, headers: &HeaderMap) -> Result<String, Response> {
        self.authorized_requests.fetch_add(1, Ordering::SeqCst);
        let token = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        token
            .and_then(|token| self.valid_tokens.lock().unwrap().get(token).cloned())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "unauthorized access" })),
                )
                    .into_response()
            })
    }
}

/// Running fake server; stops when dropped
pub struct FakeServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .route("/api/users", post(register_user))
            .route("/api/users/role/:email", get(user_role))
            .route("/api/contests", get(list_contests))
            .route("/api/contests/:id", get(get_contest))
            .route("/api/payments/participated", get(participated))
            .route("/securetoken/token", post(refresh_token))
            .fallback(identity_toolkit)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.addr)
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(&self.url("api/"), Duration::from_secs(5)).unwrap()
    }

    pub fn firebase_config(&self) -> FirebaseConfig {
        FirebaseConfig {
            api_key: API_KEY.to_owned(),
            project_id: Some("contest-hub-test".to_owned()),
            identity_toolkit_url: Url::parse(&self.url("identity/")).unwrap(),
            secure_token_url: Url::parse(&self.url("securetoken/")).unwrap(),
        }
    }

    pub fn client_config(&self, session_file: PathBuf) -> ClientConfig {
        ClientConfig {
            environment: Environment::Testing,
            backend: self.backend_config(),
            payment: PaymentConfig {
                public_key: "pk_test_123".to_owned(),
            },
            firebase: self.firebase_config(),
            session_file,
        }
    }

    /// Password account; `role` also puts it in the user directory
    pub fn add_account(&self, email: &str, password: &str, role: Option<Role>) -> String {
        let local_id = format!("uid-{}", email.split('@').next().unwrap_or(email));
        self.state.accounts.lock().unwrap().insert(
            email.to_owned(),
            Account {
                local_id: local_id.clone(),
                password: password.to_owned(),
                display_name: None,
            },
        );
        if let Some(role) = role {
            self.set_role(email, role);
        }
        local_id
    }

    /// Federated ID token accepted by `accounts:signInWithIdp`
    pub fn add_idp_token(&self, id_token: &str, email: &str, name: &str) {
        self.state
            .idp_tokens
            .lock()
            .unwrap()
            .insert(id_token.to_owned(), (email.to_owned(), name.to_owned()));
    }

    pub fn set_role(&self, email: &str, role: Role) {
        self.state
            .directory
            .lock()
            .unwrap()
            .insert(email.to_owned(), role);
    }

    pub fn directory_role(&self, email: &str) -> Option<Role> {
        self.state.directory.lock().unwrap().get(email).copied()
    }

    pub fn registrations(&self) -> Vec<NewUser> {
        self.state.registrations.lock().unwrap().clone()
    }

    /// Refresh token minted for nobody in particular, bound to `local_id`
    pub fn mint_refresh_token(&self, local_id: &str, email: &str) -> String {
        self.state.issue(local_id, email).1
    }

    /// Every issued ID token stops being accepted by the backend
    pub fn revoke_tokens(&self) {
        self.state.valid_tokens.lock().unwrap().clear();
    }

    pub fn is_token_valid(&self, token: &str) -> bool {
        self.state.valid_tokens.lock().unwrap().contains_key(token)
    }

    pub fn authorized_requests(&self) -> usize {
        self.state.authorized_requests.load(Ordering::SeqCst)
    }

    pub fn add_contest(&self, id: &str, name: &str, contest_type: &str) {
        self.state.contests.lock().unwrap().push(Contest {
            id: id.to_owned(),
            name: name.to_owned(),
            image: None,
            description: format!("{name} description"),
            price: 10.0,
            prize: "$100".to_owned(),
            task_instruction: "Submit a link".to_owned(),
            contest_type: contest_type.to_owned(),
            deadline: Utc::now() + ChronoDuration::days(7),
            creator_email: "creator@example.com".to_owned(),
            participation_count: 3,
            status: ContestStatus::Approved,
            winner: None,
        });
    }
}

fn firebase_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "code": 400, "message": message } })),
    )
        .into_response()
}

async fn identity_toolkit(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("key").map(String::as_str) != Some(API_KEY) {
        return firebase_error("API key not valid. Please pass a valid API key.");
    }

    let path = uri.path();
    if path.ends_with("accounts:signInWithPassword") {
        password_sign_in(&state, &body)
    } else if path.ends_with("accounts:signInWithIdp") {
        idp_sign_in(&state, &body)
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn password_sign_in(state: &ServerState, body: &Value) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let account = state.accounts.lock().unwrap().get(email).cloned();
    let Some(account) = account else {
        return firebase_error("EMAIL_NOT_FOUND");
    };
    if account.password != password {
        return firebase_error("INVALID_LOGIN_CREDENTIALS");
    }

    let (id_token, refresh_token) = state.issue(&account.local_id, email);
    Json(json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": account.local_id,
        "email": email,
        "displayName": account.display_name.unwrap_or_default(),
        "idToken": id_token,
        "refreshToken": refresh_token,
        "expiresIn": "3600",
        "registered": true
    }))
    .into_response()
}

fn idp_sign_in(state: &ServerState, body: &Value) -> Response {
    let post_body = body["postBody"].as_str().unwrap_or_default();
    let params: HashMap<String, String> =
        serde_urlencoded::from_str(post_body).unwrap_or_default();
    let assertion = params.get("id_token").cloned().unwrap_or_default();
    let known = state.idp_tokens.lock().unwrap().get(&assertion).cloned();
    let Some((email, name)) = known else {
        return firebase_error("INVALID_IDP_RESPONSE : Invalid Idp Response");
    };

    let local_id = format!("fed-{}", email.split('@').next().unwrap_or_default());
    let (id_token, refresh_token) = state.issue(&local_id, &email);
    Json(json!({
        "federatedId": format!("https://accounts.google.com/{local_id}"),
        "providerId": params.get("providerId").cloned().unwrap_or_default(),
        "localId": local_id,
        "email": email,
        "displayName": name,
        "photoUrl": "https://example.com/photo.png",
        "idToken": id_token,
        "refreshToken": refresh_token,
        "expiresIn": "3600"
    }))
    .into_response()
}

async fn refresh_token(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if query.get("key").map(String::as_str) != Some(API_KEY) {
        return firebase_error("API key not valid. Please pass a valid API key.");
    }
    if form.get("grant_type").map(String::as_str) != Some("refresh_token") {
        return firebase_error("INVALID_GRANT_TYPE");
    }

    let presented = form.get("refresh_token").cloned().unwrap_or_default();
    let owner = state.refresh_tokens.lock().unwrap().get(&presented).cloned();
    let Some((local_id, email)) = owner else {
        return firebase_error("INVALID_REFRESH_TOKEN");
    };

    let (id_token, _) = state.issue(&local_id, &email);
    Json(json!({
        "expires_in": "3600",
        "token_type": "Bearer",
        "refresh_token": presented,
        "id_token": id_token,
        "user_id": local_id
    }))
    .into_response()
}

async fn register_user(
    State(state): State<Arc<ServerState>>,
    Json(user): Json<NewUser>,
) -> Response {
    state.registrations.lock().unwrap().push(user.clone());
    let mut directory = state.directory.lock().unwrap();
    if directory.contains_key(&user.email) {
        return Json(json!({ "insertedId": null })).into_response();
    }
    directory.insert(user.email.clone(), user.role);
    let id = format!("user-{}", directory.len());
    (StatusCode::OK, Json(json!({ "insertedId": id }))).into_response()
}

async fn user_role(
    State(state): State<Arc<ServerState>>,
    Path(email): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.caller(&headers) {
        return rejection;
    }
    let role = state.directory.lock().unwrap().get(&email).copied();
    match role {
        Some(role) => Json(json!({ "role": role })).into_response(),
        None => Json(json!({})).into_response(),
    }
}

async fn list_contests(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Contest>> {
    let search = query.get("search").map(|s| s.to_lowercase());
    let contests = state
        .contests
        .lock()
        .unwrap()
        .iter()
        .filter(|contest| {
            search.as_deref().map_or(true, |needle| {
                contest.name.to_lowercase().contains(needle)
                    || contest.contest_type.to_lowercase().contains(needle)
            })
        })
        .cloned()
        .collect();
    Json(contests)
}

async fn get_contest(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.caller(&headers) {
        return rejection;
    }
    let contest = state
        .contests
        .lock()
        .unwrap()
        .iter()
        .find(|contest| contest.id == id)
        .cloned();
    match contest {
        Some(contest) => Json(contest).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "contest not found" })),
        )
            .into_response(),
    }
}

async fn participated(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = state.caller(&headers) {
        return rejection;
    }
    Json(Vec::<Contest>::new()).into_response()
}
