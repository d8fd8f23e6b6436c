//! Admin actions
//!
//! Form-driven mutations behind the session gate. Login and logout set
//! their own session cookie on the response; the gate leaves those
//! alone. Content mutations require an admin account and answer with a
//! 302 back to the dashboard.

use axum::{
    extract::{Extension, Form, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::{
    clear_session_cookie, redirect_found, session_cookie, AppState, PageError,
};
use crate::models::CreateGalleryItemInput;
use crate::services::{AuthError, AuthSession, GalleryServiceError};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

fn dashboard_error(message: &str) -> Response {
    redirect_found(&format!("/admin?error={}", urlencoding::encode(message)))
}

/// Admin-only guard for content mutations. Anonymous visitors get sent
/// to the login page; signed-in non-admins get a 403.
fn require_admin(auth: &AuthSession) -> Option<Response> {
    match &auth.user {
        None => Some(redirect_found("/admin/login")),
        Some(user) if !user.is_admin => Some(StatusCode::FORBIDDEN.into_response()),
        Some(_) => None,
    }
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.auth_service.login(&form.username, &form.password).await {
        Ok((token, session)) => {
            let cookie = session_cookie(&state.session, &token, session.expires_at);
            Ok(with_cookie(redirect_found("/admin"), &cookie))
        }
        Err(AuthError::InvalidCredentials) => {
            let mut ctx = TeraContext::new();
            ctx.insert("error", "Invalid username or password");
            let body = state.views.render("admin/login.html", &ctx)?;
            Ok((StatusCode::UNAUTHORIZED, Html(body)).into_response())
        }
        Err(AuthError::Internal(e)) => Err(e.into()),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Response, PageError> {
    let Some(session) = auth.session else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    state.auth_service.logout(&session.id).await?;

    let cookie = clear_session_cookie(&state.session);
    Ok(with_cookie(redirect_found("/admin/login"), &cookie))
}

pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<ItemForm>,
) -> Result<Response, PageError> {
    if let Some(denied) = require_admin(&auth) {
        return Ok(denied);
    }

    let category_id = match form.category_id.trim() {
        "" => None,
        raw => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => return Ok(dashboard_error("Invalid category")),
        },
    };

    let input = CreateGalleryItemInput {
        title: form.title,
        description: if form.description.trim().is_empty() {
            None
        } else {
            Some(form.description)
        },
        image_url: form.image_url,
        category_id,
    };

    match state.gallery_service.create_item(input).await {
        Ok(_) => Ok(redirect_found("/admin")),
        Err(GalleryServiceError::ValidationError(message)) => Ok(dashboard_error(&message)),
        Err(e) => Err(anyhow::Error::new(e).into()),
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    if let Some(denied) = require_admin(&auth) {
        return Ok(denied);
    }

    match state.gallery_service.delete_item(id).await {
        Ok(()) => Ok(redirect_found("/admin")),
        Err(GalleryServiceError::NotFound) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(e) => Err(anyhow::Error::new(e).into()),
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, PageError> {
    if let Some(denied) = require_admin(&auth) {
        return Ok(denied);
    }

    match state.gallery_service.create_category(&form.name).await {
        Ok(_) => Ok(redirect_found("/admin")),
        Err(GalleryServiceError::ValidationError(message)) => Ok(dashboard_error(&message)),
        Err(GalleryServiceError::CategoryExists) => {
            Ok(dashboard_error("A category with that name already exists"))
        }
        Err(e) => Err(anyhow::Error::new(e).into()),
    }
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    if let Some(denied) = require_admin(&auth) {
        return Ok(denied);
    }

    match state.gallery_service.delete_category(id).await {
        Ok(()) => Ok(redirect_found("/admin")),
        Err(GalleryServiceError::NotFound) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(e) => Err(anyhow::Error::new(e).into()),
    }
}
