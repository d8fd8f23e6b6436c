//! Public pages and the admin dashboard

use axum::{
    extract::{Extension, Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::{redirect_found, AppState, PageError};
use crate::services::AuthSession;

/// Home page: the ten newest items. A listing failure degrades to an
/// empty page instead of a 500.
pub async fn home(State(state): State<AppState>) -> Result<Response, PageError> {
    let items = match state.gallery_service.list_recent(10).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load recent items: {:#}", e);
            Vec::new()
        }
    };

    let mut ctx = TeraContext::new();
    ctx.insert("items", &items);
    Ok(Html(state.views.render("home.html", &ctx)?).into_response())
}

/// Full gallery with category listing. Degrades to empty lists on a
/// store failure, same as the home page.
pub async fn gallery(State(state): State<AppState>) -> Result<Response, PageError> {
    let items = match state.gallery_service.list_items().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load gallery items: {:#}", e);
            Vec::new()
        }
    };
    let categories = match state.gallery_service.list_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to load categories: {:#}", e);
            Vec::new()
        }
    };

    let mut ctx = TeraContext::new();
    ctx.insert("items", &items);
    ctx.insert("categories", &categories);
    Ok(Html(state.views.render("gallery.html", &ctx)?).into_response())
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub error: Option<String>,
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, PageError> {
    let Some(user) = auth.user else {
        return Ok(redirect_found("/admin/login"));
    };

    let items = state.gallery_service.list_items().await?;
    let categories = state.gallery_service.list_categories().await?;

    let mut ctx = TeraContext::new();
    ctx.insert("user", &user);
    ctx.insert("items", &items);
    ctx.insert("categories", &categories);
    if let Some(error) = query.error {
        ctx.insert("error", &error);
    }
    Ok(Html(state.views.render("admin/dashboard.html", &ctx)?).into_response())
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Response, PageError> {
    if auth.is_authenticated() {
        return Ok(redirect_found("/admin"));
    }

    let ctx = TeraContext::new();
    Ok(Html(state.views.render("admin/login.html", &ctx)?).into_response())
}
