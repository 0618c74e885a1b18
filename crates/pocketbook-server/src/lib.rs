//! Pocketbook Web Server
//!
//! Axum-based REST API for the Pocketbook personal finance tracker.
//!
//! Security features:
//! - Bearer API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Upload size limit for profile pictures
//! - Sanitized error responses

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use pocketbook_core::{
    Clock, Database, Error as CoreError, IdentityProvider, LocalIdentity, LocalObjectStore,
    ObjectStore, SystemClock,
};

mod handlers;
mod scheduler;

pub use scheduler::{run_rollover_for_all, start_rollover_scheduler, RolloverScheduleConfig};

/// Maximum profile picture upload size (5 MB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "POCKETBOOK_API_KEYS";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Parse a comma-separated key list, ignoring blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn ObjectStore>,
    /// Source of "today" for default periods and the rollover endpoint
    pub clock: Arc<dyn Clock>,
}

/// Authentication middleware - validates bearer API keys
///
/// Keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        tracing::debug!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && provided_bytes.ct_eq(key_bytes).into() {
            return true;
        }
    }
    false
}

/// Create the application router
pub fn create_router(db: Database, store: Arc<dyn ObjectStore>, config: ServerConfig) -> Router {
    create_router_with_options(db, store, config, Arc::new(SystemClock), None)
}

/// Create the application router with additional options (for testing)
///
/// When `storage_dir` is given, its contents are served read-only under
/// `/storage` so public blob URLs resolve.
pub fn create_router_with_options(
    db: Database,
    store: Arc<dyn ObjectStore>,
    config: ServerConfig,
    clock: Arc<dyn Clock>,
    storage_dir: Option<&Path>,
) -> Router {
    info!("Object store backend: {}", store.name());

    let state = Arc::new(AppState {
        identity: Arc::new(LocalIdentity::new(db.clone())),
        db,
        config: config.clone(),
        store,
        clock,
    });

    let api_routes = Router::new()
        // Identity
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/signin", post(handlers::sign_in))
        .route("/users/:user_id/account", put(handlers::update_account))
        // Ledger
        .route(
            "/users/:user_id/transactions",
            get(handlers::list_transactions),
        )
        .route("/users/:user_id/entries", post(handlers::submit_entry))
        .route("/users/:user_id/loans", get(handlers::list_loans))
        .route(
            "/users/:user_id/loans/active",
            get(handlers::list_active_loans),
        )
        .route("/users/:user_id/dashboard", get(handlers::get_dashboard))
        // Goals
        .route(
            "/users/:user_id/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/users/:user_id/goals/:id/toggle",
            post(handlers::toggle_goal),
        )
        // Rollover
        .route("/users/:user_id/rollover", post(handlers::run_rollover))
        // Profile picture
        .route(
            "/users/:user_id/profile-picture",
            get(handlers::get_profile_picture).put(handlers::upload_profile_picture),
        )
        // Privileged account deletion
        .route(
            "/delete-user",
            post(handlers::delete_user).fallback(handlers::method_not_allowed),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: same-origin only, images may also come from blob: and data:
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    if let Some(dir) = storage_dir {
        app = app.nest_service("/storage", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!(
            "No API keys configured ({} is empty); every /api request will be rejected",
            API_KEYS_ENV
        );
    }

    let store = LocalObjectStore::from_env()?;
    let storage_dir = store.root().to_path_buf();
    info!("Object store directory: {}", storage_dir.display());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Start rollover scheduler if configured
    if let Some(schedule) = RolloverScheduleConfig::from_env() {
        start_rollover_scheduler(db.clone(), clock.clone(), schedule);
    }

    let app = create_router_with_options(
        db,
        Arc::new(store),
        config,
        clock,
        Some(&storage_dir),
    )
    .into_make_service_with_connect_info::<std::net::SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Rejections from the engine are user-facing
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::Validation(v)) => return Self::bad_request(&v.to_string()),
            Some(CoreError::NotFound(what)) => {
                return Self::not_found(&format!("{} not found", what))
            }
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
