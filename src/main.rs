//! Club Site Backend
//!
//! Public club website and session-gated admin panel over flat JSON documents.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod uploads;
mod web;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionStore;
use config::Config;
use db::{JsonStore, Repository};
use uploads::{UploadStore, MAX_UPLOAD_BYTES};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub uploads: Arc<UploadStore>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the data and upload directories, seeding missing documents.
    pub fn open(config: Config) -> Result<Self, errors::AppError> {
        let store = JsonStore::new(&config.data_dir);
        store.init()?;

        let uploads = Arc::new(UploadStore::new(&config.static_dir));
        uploads.init()?;

        let sessions = SessionStore::new(
            config.session_secret.as_deref(),
            config.session_ttl,
            config.secure_cookies,
        );

        Ok(Self {
            repo: Arc::new(Repository::new(store, uploads.clone())),
            uploads,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting club site backend");
    tracing::info!("Static directory: {:?}", config.static_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured (CLUB_ADMIN_PASSWORD). Admin login is disabled!");
    }
    if config.session_secret.is_none() {
        tracing::warn!(
            "No session secret configured (CLUB_SESSION_SECRET). Sessions will not survive a restart."
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::open(config)?;
    tracing::info!("Data directory: {:?}", state.repo.store().data_dir());
    spawn_session_sweeper(state.sessions.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Drop expired sessions once an hour.
fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired admin sessions");
            }
        }
    });
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart framing on top of the largest accepted file
    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_BYTES as usize + 1024 * 1024);

    // Public JSON API
    let public_api = Router::new()
        .route("/events", get(api::public_events))
        .route("/members", get(api::public_members))
        .route("/data", get(api::public_data));

    // Admin JSON API
    let admin_api = Router::new()
        .route("/dashboard", get(api::api_dashboard))
        .route(
            "/club-info",
            get(api::api_get_club_info).put(api::api_update_club_info),
        )
        .route(
            "/contact",
            get(api::api_get_contact).put(api::api_update_contact),
        )
        // Events
        .route(
            "/events",
            get(api::api_list_events).post(api::api_create_event),
        )
        .route(
            "/events/{id}",
            get(api::api_get_event)
                .put(api::api_update_event)
                .delete(api::api_delete_event),
        )
        .route(
            "/events/{id}/toggle-visibility",
            post(api::api_toggle_event_visibility),
        )
        // Members
        .route(
            "/members",
            get(api::api_list_members).post(api::api_create_member),
        )
        .route(
            "/members/{index}",
            get(api::api_get_member)
                .put(api::api_update_member)
                .delete(api::api_delete_member),
        )
        // Gallery
        .route(
            "/gallery",
            get(api::api_list_gallery).post(api::api_create_gallery_item),
        )
        .route(
            "/gallery/{index}",
            get(api::api_get_gallery_item)
                .put(api::api_update_gallery_item)
                .delete(api::api_delete_gallery_item),
        )
        // Uploads
        .route("/upload", post(api::upload_image).layer(upload_limit.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        // Token exchange (no auth required)
        .route("/login", post(api::api_login))
        .route("/logout", post(api::api_logout))
        .route("/verify", get(api::api_verify));

    // Admin panel
    let admin_pages = Router::new()
        .route("/", get(web::dashboard))
        .route(
            "/club-info",
            get(web::club_info_page).post(web::club_info_submit),
        )
        .route("/contact", get(web::contact_page).post(web::contact_submit))
        // Events
        .route(
            "/events",
            get(web::events_admin_page).post(web::event_create),
        )
        .route(
            "/events/{id}/edit",
            get(web::event_edit_page).post(web::event_edit_submit),
        )
        .route("/events/{id}/delete", post(web::event_delete))
        .route("/events/{id}/delete-image", post(web::event_delete_image))
        .route(
            "/events/{id}/toggle-visibility",
            post(web::event_toggle_visibility),
        )
        // Members
        .route(
            "/members",
            get(web::members_admin_page).post(web::member_create),
        )
        .route(
            "/members/{index}/edit",
            get(web::member_edit_page).post(web::member_edit_submit),
        )
        .route("/members/{index}/delete", post(web::member_delete))
        // Gallery
        .route(
            "/gallery",
            get(web::gallery_admin_page).post(web::gallery_create),
        )
        .route(
            "/gallery/{index}/edit",
            get(web::gallery_edit_page).post(web::gallery_edit_submit),
        )
        .route("/gallery/{index}/delete", post(web::gallery_delete))
        // Uploads
        .route(
            "/upload",
            get(web::upload_page)
                .post(api::upload_image)
                .layer(upload_limit),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ))
        // Login flow (no session required)
        .route("/login", get(web::login_page).post(web::login_submit))
        .route("/logout", get(web::logout).post(web::logout));

    // Public site
    let public_pages = Router::new()
        .route("/", get(web::home_page))
        .route("/about", get(web::about_page))
        .route("/events", get(web::events_page))
        .route("/events/{id}", get(web::event_page))
        .route("/members", get(web::members_page))
        .route("/gallery", get(web::gallery_page));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api/admin", admin_api)
        .nest("/api", public_api)
        .nest("/admin", admin_pages)
        .nest_service("/static", static_files)
        .merge(public_pages)
        .merge(health_routes)
        .fallback(web::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
