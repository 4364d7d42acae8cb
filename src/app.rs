use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use tower::Layer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyCors, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::auth::TokenVerifier;
use crate::config::{AppConfig, SecurityConfig};
use crate::error::ApiError;
use crate::handlers::{protected::notes, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::NoteService;
use crate::store;

/// Shared handler state. Everything in here is immutable once built.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<NoteService>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(notes: NoteService, verifier: TokenVerifier) -> Self {
        Self {
            notes: Arc::new(notes),
            verifier: Arc::new(verifier),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = store::from_config(&config.store).context("failed to build document store")?;
        tracing::info!(
            "Using {} store (database '{}', collection '{}')",
            store.name(),
            config.store.database_id,
            config.store.collection_id
        );

        let notes = NoteService::new(store, &config.store.database_id, &config.store.collection_id);
        let verifier = TokenVerifier::from_config(&config.security).context("failed to configure token verification")?;

        Ok(Self::new(notes, verifier))
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .nest("/api/notes", note_routes(&state))
        .fallback(not_found)
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// `app` with trailing slashes trimmed before routing, so `/api/notes/`
/// reaches the same handlers as `/api/notes`
pub fn service(state: AppState, config: &AppConfig) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app(state, config))
}

fn note_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(notes::notes_get).post(notes::notes_post))
        .route("/:id", put(notes::note_put).delete(notes::note_delete))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            jwt_auth_middleware,
        ))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AnyCors)
        .allow_headers(AnyCors)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Catch-all for panics escaping a handler
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Unhandled failure: {}", detail);

    ApiError::Unhandled.into_response()
}
