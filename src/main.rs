//! Galleria - a lightweight server-rendered photo gallery CMS

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use galleria::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxGalleryCategoryRepository, SqlxGalleryItemRepository, SqlxSessionRepository,
            SqlxUserRepository, UserRepository,
        },
    },
    models::User,
    services::{password, AuthService, CloudinaryClient, GalleryService},
    view::ViewEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galleria=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Galleria...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    bootstrap_admin(&config, user_repo.clone()).await?;

    let auth_service = AuthService::new(
        user_repo,
        SqlxSessionRepository::boxed(pool.clone()),
        config.session.clone(),
    );

    let cloudinary = CloudinaryClient::new(&config.cloudinary);
    if !cloudinary.is_configured() {
        tracing::warn!("Cloudinary credentials missing, remote image cleanup disabled");
    }

    let gallery_service = GalleryService::new(
        SqlxGalleryItemRepository::boxed(pool.clone()),
        SqlxGalleryCategoryRepository::boxed(pool),
        cloudinary,
    );

    let views = ViewEngine::new()?;

    let state = AppState {
        auth_service,
        gallery_service,
        views,
        session: config.session.clone(),
    };

    let app = api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the initial admin account when the user table is empty and
/// the config provides bootstrap credentials.
async fn bootstrap_admin(
    config: &Config,
    user_repo: std::sync::Arc<dyn UserRepository>,
) -> Result<()> {
    let Some(admin) = &config.admin else {
        return Ok(());
    };

    if user_repo.count().await? > 0 {
        return Ok(());
    }

    let hash = password::hash_password(&admin.password)?;
    user_repo
        .create(&User::new(admin.username.clone(), hash, true))
        .await?;
    tracing::info!("Created initial admin user '{}'", admin.username);

    Ok(())
}
