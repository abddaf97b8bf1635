// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Route paths, backend endpoint paths, header names and environment variable names

//! Constants module
//!
//! Constants are grouped by domain so that the route table, the API clients
//! and the configuration loader agree on the same literal values.

/// Client-side route paths
pub mod routes {
    /// Landing page
    pub const HOME: &str = "/";
    /// Sign-in view
    pub const SIGN_IN: &str = "/login";
    /// Account registration view
    pub const SIGN_UP: &str = "/register";
    /// Contest catalogue
    pub const CONTESTS: &str = "/contests";
    /// Contest detail
    pub const CONTEST_DETAIL: &str = "/contests/:id";
    /// Contest registration (requires sign-in)
    pub const CONTEST_REGISTER: &str = "/contests/:id/register";
    /// Payment for a contest registration
    pub const PAYMENT: &str = "/payment/:id";
    /// Leaderboard of winners
    pub const LEADERBOARD: &str = "/leaderboard";
    /// Dashboard landing page (any signed-in user)
    pub const DASHBOARD: &str = "/dashboard";
    /// Profile page inside the dashboard
    pub const DASHBOARD_PROFILE: &str = "/dashboard/profile";
    /// Contests the user participated in
    pub const MY_PARTICIPATED: &str = "/dashboard/my-participated";
    /// Contests the user won
    pub const MY_WINNING: &str = "/dashboard/my-winning";
    /// Creator: add a contest
    pub const ADD_CONTEST: &str = "/dashboard/add-contest";
    /// Creator: contests created by the creator
    pub const MY_CREATED: &str = "/dashboard/my-created";
    /// Creator: edit one of the creator's contests
    pub const EDIT_CONTEST: &str = "/dashboard/edit-contest/:id";
    /// Creator: submissions for one contest
    pub const CONTEST_SUBMITTED: &str = "/dashboard/submitted/:id";
    /// Admin: user management
    pub const MANAGE_USERS: &str = "/dashboard/manage-users";
    /// Admin: contest moderation
    pub const MANAGE_CONTESTS: &str = "/dashboard/manage-contests";
    /// Any other dashboard page
    pub const DASHBOARD_ANY: &str = "/dashboard/*";

    /// Query parameter carrying the originally requested path to the sign-in view
    pub const RETURN_PARAM: &str = "from";
}

/// Backend REST endpoint paths (relative to the API base URL)
pub mod endpoints {
    /// User directory collection
    pub const USERS: &str = "users";
    /// Role lookup by email (`users/role/{email}`)
    pub const USER_ROLE: &str = "users/role";
    /// Contest collection
    pub const CONTESTS: &str = "contests";
    /// Popular contests
    pub const CONTESTS_POPULAR: &str = "contests/popular";
    /// Contests created by the signed-in creator
    pub const CONTESTS_MINE: &str = "contests/mine";
    /// Every contest including unapproved ones (admin)
    pub const CONTESTS_ALL: &str = "contests/all";
    /// Payment intent creation
    pub const PAYMENT_INTENT: &str = "payments/intent";
    /// Payment records
    pub const PAYMENTS: &str = "payments";
    /// Contests the signed-in user paid for
    pub const PAYMENTS_PARTICIPATED: &str = "payments/participated";
    /// Task submissions
    pub const SUBMISSIONS: &str = "submissions";
    /// Submissions for one contest (`submissions/contest/{id}`)
    pub const SUBMISSIONS_BY_CONTEST: &str = "submissions/contest";
    /// Winning submissions of the signed-in user
    pub const SUBMISSIONS_WINNING: &str = "submissions/winning";
}

/// Environment variable names read at startup
pub mod env_vars {
    /// Backend base URL (required)
    pub const API_URL: &str = "CONTEST_HUB_API_URL";
    /// Payment gateway publishable key (required)
    pub const PAYMENT_PUBLIC_KEY: &str = "CONTEST_HUB_PAYMENT_PUBLIC_KEY";
    /// Identity provider web API key (required)
    pub const FIREBASE_API_KEY: &str = "FIREBASE_API_KEY";
    /// Identity provider project id
    pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
    /// Override for the identity toolkit endpoint (emulators, tests)
    pub const FIREBASE_IDENTITY_TOOLKIT_URL: &str = "FIREBASE_IDENTITY_TOOLKIT_URL";
    /// Override for the secure token endpoint (emulators, tests)
    pub const FIREBASE_SECURE_TOKEN_URL: &str = "FIREBASE_SECURE_TOKEN_URL";
    /// Location of the persisted session file
    pub const SESSION_FILE: &str = "CONTEST_HUB_SESSION_FILE";
    /// Per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "CONTEST_HUB_REQUEST_TIMEOUT_SECS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Identity provider defaults
pub mod firebase {
    /// Identity toolkit REST base
    pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
    /// Secure token REST base
    pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
    /// Provider id used for Google federated sign-in
    pub const GOOGLE_PROVIDER_ID: &str = "google.com";
    /// Request URI sent with IdP assertions
    pub const IDP_REQUEST_URI: &str = "http://localhost";
}

/// Defaults used when optional configuration is absent
pub mod defaults {
    /// Default per-request timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Directory under the user config dir holding client state
    pub const CONFIG_DIR_NAME: &str = "contest-hub";
    /// Persisted session file name
    pub const SESSION_FILE_NAME: &str = "session.json";
    /// Header carrying a per-request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}
