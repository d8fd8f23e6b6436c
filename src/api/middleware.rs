//! Request middleware
//!
//! The session gate runs on every request: it resolves the session
//! cookie to an `AuthSession` request extension, and on the way out
//! keeps the cookie in step with the store (refreshed expiry for valid
//! sessions, cleared for dead ones).

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::config::SessionConfig;
use crate::services::{AuthService, AuthSession, GalleryService};
use crate::view::ViewEngine;

/// Paths answered with a bare 404 before any session work.
/// Chromium probes this on every page load when DevTools is open.
const IGNORED_PATHS: &[&str] = &["/.well-known/appspecific/com.chrome.devtools.json"];

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub gallery_service: GalleryService,
    pub views: ViewEngine,
    pub session: SessionConfig,
}

/// Error page for handler failures
#[derive(Debug)]
pub struct PageError(pub anyhow::Error);

impl<E> From<E> for PageError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong</h1>".to_string()),
        )
            .into_response()
    }
}

/// 302 redirect. Axum's `Redirect::to` answers 303, which changes the
/// method on redirect; these pages rely on a plain 302.
pub fn redirect_found(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// Extract the session token from the Cookie header
pub fn session_token_from_headers(
    headers: &axum::http::HeaderMap,
    cookie_name: &str,
) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(cookie_name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Set-Cookie value carrying the session token
pub fn session_cookie(config: &SessionConfig, token: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "{}={}; Path=/; Expires={}; HttpOnly; Secure; SameSite=Lax",
        config.cookie_name,
        token,
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
    )
}

/// Set-Cookie value that removes the session cookie
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax",
        config.cookie_name,
    )
}

fn response_sets_session_cookie(response: &Response, cookie_name: &str) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(cookie_name) && v[cookie_name.len()..].starts_with('='))
}

fn append_set_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// Session gate, applied to every route.
///
/// Requests without a cookie proceed anonymously. A store failure is a
/// hard 500 rather than a silent logout. After the handler runs, the
/// cookie is refreshed or cleared to match the validation result,
/// unless the handler already set the session cookie itself.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if IGNORED_PATHS.contains(&request.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let token = session_token_from_headers(request.headers(), &state.session.cookie_name);

    let auth = match &token {
        None => AuthSession::anonymous(),
        Some(token) => match state.auth_service.validate_session_token(token).await {
            Ok(auth) => auth,
            Err(e) => return PageError::from(e.context("Session validation failed")).into_response(),
        },
    };

    request.extensions_mut().insert(auth.clone());
    let mut response = next.run(request).await;

    // Login and logout manage the cookie themselves.
    if response_sets_session_cookie(&response, &state.session.cookie_name) {
        return response;
    }

    match (&token, &auth.session) {
        (Some(token), Some(session)) => {
            append_set_cookie(
                &mut response,
                &session_cookie(&state.session, token, session.expires_at),
            );
        }
        (Some(_), None) => {
            append_set_cookie(&mut response, &clear_session_cookie(&state.session));
        }
        (None, _) => {}
    }

    response
}
