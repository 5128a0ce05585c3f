//! Authentication for the dashboard.
//!
//! Form login with signed session cookies when users are configured in
//! rowlens.yaml. With no users configured every visitor is the local
//! operator and holds the `read` capability.

use axum::{
    Form,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rowlens_core::config::CAPABILITY_READ;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::DashboardError;
use crate::nonce::{constant_time_eq, now_secs};
use crate::state::AppState;
use crate::templates::{self, html_escape};

/// Session cookie name
const SESSION_COOKIE_NAME: &str = "rowlens_session";

/// Session lifetime in seconds
const SESSION_MAX_AGE: u64 = 86_400;

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Empty for anonymous visitors and the local operator.
    pub username: String,
    pub capabilities: Vec<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            capabilities: Vec::new(),
        }
    }

    fn operator() -> Self {
        Self {
            username: String::new(),
            capabilities: vec![CAPABILITY_READ.to_string()],
        }
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn is_logged_in(&self) -> bool {
        !self.username.is_empty()
    }
}

fn session_signature(state: &AppState, username: &str, issued_at: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(state.nonces().secret());
    hasher.update(b"|session|");
    hasher.update(username.as_bytes());
    hasher.update(b"|");
    hasher.update(issued_at.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session token for a user: `<user>.<issued at>.<signature>`.
fn create_session_token(state: &AppState, username: &str, now: u64) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(username),
        now,
        session_signature(state, username, now)
    )
}

/// Validate a session token, returning the username it was issued for.
///
/// Tokens older than [`SESSION_MAX_AGE`] or issued in the future are rejected.
fn validate_session(state: &AppState, session: &str, now: u64) -> Option<String> {
    let mut parts = session.splitn(3, '.');
    let (encoded, issued_at, signature) = (parts.next()?, parts.next()?, parts.next()?);
    let issued_at: u64 = issued_at.parse().ok()?;
    if issued_at > now || now - issued_at > SESSION_MAX_AGE {
        return None;
    }
    let username = String::from_utf8(URL_SAFE_NO_PAD.decode(encoded).ok()?).ok()?;
    let expected = session_signature(state, &username, issued_at);
    constant_time_eq(expected.as_bytes(), signature.as_bytes()).then_some(username)
}

/// Extract session cookie value from cookie header
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|cookie| {
        cookie
            .trim()
            .strip_prefix(&format!("{}=", SESSION_COOKIE_NAME))
            .map(|v| v.to_string())
    })
}

/// Resolve the principal for a request.
pub fn principal(state: &AppState, headers: &HeaderMap) -> Principal {
    let auth = &state.config().dashboard.auth;
    if !auth.is_configured() {
        return Principal::operator();
    }

    extract_session_cookie(headers)
        .and_then(|session| validate_session(state, &session, now_secs()))
        .and_then(|username| auth.find_user(&username))
        .map(|user| Principal {
            username: user.username.clone(),
            capabilities: user.capabilities.clone(),
        })
        .unwrap_or_else(Principal::anonymous)
}

/// Guard for pages that need the `read` capability.
///
/// Anonymous visitors are sent to the login page; logged-in users without
/// the capability get a 403.
pub async fn require_read(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let who = principal(&state, request.headers());
    if who.can(CAPABILITY_READ) {
        return next.run(request).await;
    }

    if who.is_logged_in() {
        tracing::debug!(user = %who.username, "Denied page without read capability");
        return (
            StatusCode::FORBIDDEN,
            DashboardError::InsufficientPermissions.to_string(),
        )
            .into_response();
    }

    let redirect_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/admin");
    Redirect::to(&format!("/login?redirect={}", urlencoding::encode(redirect_to))).into_response()
}

/// Login page query parameters
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Only same-site absolute paths are followed after login. Browsers read
/// `//host` and `/\host` as another origin.
fn safe_redirect(redirect: Option<String>) -> String {
    redirect
        .filter(|r| r.starts_with('/') && !r.starts_with("//") && !r.starts_with("/\\"))
        .unwrap_or_else(|| "/admin".to_string())
}

/// Handler for the login page (GET)
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(login_page_template(
        query.redirect.as_deref(),
        query.error.is_some(),
    ))
}

/// Handler for login form submission (POST)
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let valid = state
        .config()
        .dashboard
        .auth
        .find_user(&form.username)
        .and_then(|user| user.get_password())
        .is_some_and(|password| constant_time_eq(password.as_bytes(), form.password.as_bytes()));

    if valid {
        tracing::info!(user = %form.username, "Dashboard login");
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE_NAME,
            create_session_token(&state, &form.username, now_secs()),
            SESSION_MAX_AGE
        );
        ([(header::SET_COOKIE, cookie)], Redirect::to(&safe_redirect(form.redirect))).into_response()
    } else {
        tracing::warn!(user = %form.username, "Failed dashboard login");
        let redirect = form
            .redirect
            .map(|r| format!("&redirect={}", urlencoding::encode(&r)))
            .unwrap_or_default();
        Redirect::to(&format!("/login?error=invalid{}", redirect)).into_response()
    }
}

/// Handler for logout
pub async fn logout() -> Response {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

fn login_page_template(redirect: Option<&str>, failed: bool) -> String {
    let error_html = if failed {
        r##"<div class="mb-6 p-4 bg-red-50 border border-red-200 rounded-lg text-red-700" data-testid="rowlens-login-error">
            <i class="fas fa-exclamation-circle text-red-500"></i>
            Invalid username or password. Please try again.
        </div>"##
    } else {
        ""
    };

    let redirect_input = redirect
        .map(|r| format!(r#"<input type="hidden" name="redirect" value="{}">"#, html_escape(r)))
        .unwrap_or_default();

    let form = format!(
        r##"<div class="max-w-md mx-auto mt-16 bg-white dark:bg-gray-800 rounded-2xl shadow-xl p-8">
            <h2 class="text-xl font-semibold text-gray-900 dark:text-white text-center mb-6">Sign in to rowlens</h2>
            {error_html}
            <form method="POST" action="/login" class="space-y-5">
                {redirect_input}
                {username}
                {password}
                <button type="submit" class="w-full py-3 px-4 bg-primary-600 hover:bg-primary-700 text-white font-medium rounded-lg">
                    <i class="fas fa-sign-in-alt"></i> Sign In
                </button>
            </form>
        </div>"##,
        username = templates::input("username", "Username", "text", "", "Enter your username"),
        password = templates::input("password", "Password", "password", "", "Enter your password"),
    );
    templates::bare_layout("Login", &form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[test]
    fn redirects_stay_on_site() {
        assert_eq!(safe_redirect(Some("/view?table=wp_posts".into())), "/view?table=wp_posts");
        assert_eq!(safe_redirect(Some("//evil.test".into())), "/admin");
        assert_eq!(safe_redirect(Some("https://evil.test".into())), "/admin");
        assert_eq!(safe_redirect(Some("/\\evil.test".into())), "/admin");
        assert_eq!(safe_redirect(Some("/\\/evil.test".into())), "/admin");
        assert_eq!(safe_redirect(None), "/admin");
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; rowlens_session=abc.def".parse().unwrap(),
        );
        assert_eq!(extract_session_cookie(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn sessions_expire() {
        let state = test_state();
        let issued = 1_700_000_000;
        let token = create_session_token(&state, "admin", issued);

        assert_eq!(validate_session(&state, &token, issued).as_deref(), Some("admin"));
        assert_eq!(
            validate_session(&state, &token, issued + SESSION_MAX_AGE).as_deref(),
            Some("admin")
        );
        assert_eq!(validate_session(&state, &token, issued + SESSION_MAX_AGE + 1), None);
        assert_eq!(validate_session(&state, &token, issued - 1), None);
    }

    #[test]
    fn session_issue_time_is_signed() {
        let state = test_state();
        let issued = 1_700_000_000;
        let token = create_session_token(&state, "admin", issued);
        let forged = token.replacen(&issued.to_string(), &(issued + 1000).to_string(), 1);
        assert_eq!(validate_session(&state, &forged, issued + 1000), None);
        assert_eq!(validate_session(&state, "YWRtaW4.0000", issued), None);
    }

    #[test]
    fn principals() {
        assert!(!Principal::anonymous().can(CAPABILITY_READ));
        assert!(Principal::operator().can(CAPABILITY_READ));
        assert!(!Principal::operator().is_logged_in());
    }
}
