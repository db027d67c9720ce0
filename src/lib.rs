pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::AppState;

/// Build the full router: public reads, identity-gated routes, and the global layers
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/artifacts", get(public::list_artifacts))
        .route("/artifacts/:id", get(public::get_artifact))
        .route("/search-artifacts", get(public::search_artifacts))
}

/// Identity-gated routes. The guard wraps each method router's handlers only,
/// so unmatched methods on paths shared with public routes still get a 405.
fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    let identity =
        || axum::middleware::from_fn_with_state(state.clone(), middleware::require_identity);

    Router::new()
        .route("/artifacts", post(protected::create_artifact).route_layer(identity()))
        .route(
            "/artifacts/:id",
            put(protected::update_artifact)
                .delete(protected::delete_artifact)
                .route_layer(identity()),
        )
        .route(
            "/artifacts/myCollection/:email",
            get(protected::my_collection).route_layer(identity()),
        )
        .route(
            "/artifacts/likedBy/:email",
            get(protected::liked_by).route_layer(identity()),
        )
        .route("/like/:id", patch(protected::toggle_like).route_layer(identity()))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
        ])
        .allow_credentials(true)
}
