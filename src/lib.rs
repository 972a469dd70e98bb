//! GBVMIS records backend: victims, suspects, cases and the medical and
//! police records hung off them, served as a JSON API over Postgres.

pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod record;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::models::*;
use crate::database::{RepositoryOptions, Resource};
use crate::handlers::{auth as auth_handlers, resource, suspect, system};
use crate::middleware::jwt_auth_middleware;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub options: RepositoryOptions,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            pool,
            options: RepositoryOptions::from_config(config),
        }
    }
}

/// Build the full router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .route("/api/me", get(auth_handlers::me))
        .merge(resource_routes::<Victim>("/api/victims", "/api/victim"))
        .merge(resource_routes::<Suspect>("/api/suspects", "/api/suspect"))
        .route("/api/suspect/:id/photo", get(suspect::photo))
        .route("/api/suspect/:id/fingerprints", get(suspect::fingerprints))
        .merge(resource_routes::<Case>("/api/cases", "/api/case"))
        .merge(resource_routes::<Charge>("/api/charges", "/api/charge"))
        .merge(resource_routes::<Arrest>("/api/arrests", "/api/arrest"))
        .merge(resource_routes::<PoliceOfficer>("/api/police-officers", "/api/police-officer"))
        .merge(resource_routes::<PolicePost>("/api/police-posts", "/api/police-post"))
        .merge(resource_routes::<Role>("/api/police-roles", "/api/police-role"))
        .merge(resource_routes::<HealthFacility>("/api/health-facilities", "/api/health-facility"))
        .merge(resource_routes::<HealthPractitioner>("/api/health-practitioners", "/api/health-practitioner"))
        .merge(resource_routes::<Examination>("/api/examinations", "/api/examination"))
        .merge(resource_routes::<ToxicologyReport>("/api/toxicology-reports", "/api/toxicology-report"))
        .merge(resource_routes::<Symptom>("/api/symptoms", "/api/symptom"))
        .merge(resource_routes::<PostMortemSummary>("/api/post-mortem-summaries", "/api/post-mortem-summary"))
        .route_layer(from_fn(jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/login", post(auth_handlers::login))
        .route("/api/refresh-token", post(auth_handlers::refresh))
        .merge(protected)
        .fallback(system::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Collection and item routes for one resource
///
/// `{collection}` lists, `{collection}/search` filters, `{item}` creates and
/// `{item}/:id` reads, updates and deletes.
fn resource_routes<R: Resource>(collection: &str, item: &str) -> Router<AppState> {
    Router::new()
        .route(collection, get(resource::list::<R>))
        .route(&format!("{}/search", collection), get(resource::search::<R>))
        .route(item, post(resource::create::<R>))
        .route(&format!("{}/", item), post(resource::create::<R>))
        .route(
            &format!("{}/:id", item),
            get(resource::get::<R>)
                .put(resource::update::<R>)
                .delete(resource::delete::<R>),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];
    let base = CorsLayer::new().allow_methods(methods).allow_headers(Any);

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}
