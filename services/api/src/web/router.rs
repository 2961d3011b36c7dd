//! services/api/src/web/router.rs
//!
//! Assembles the axum `Router` from the handlers and the shared state.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    analyses::{
        create_analysis_handler, get_analysis_handler, hybrid_analysis_handler,
        list_analyses_handler,
    },
    analyze::analyze_handler,
    auth::{login_handler, logout_handler, signup_handler},
    generate::{assistant_handler, report_handler, valuation_handler},
    middleware::require_auth,
    openapi::ApiDoc,
    state::AppState,
};

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ACCEPT_LANGUAGE]);
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!(origin, "CORS_ORIGIN is not a valid header value; cross-origin requests are disabled.");
            layer
        }
    }
}

/// Builds the full application: API routes, Swagger UI and the HTTP layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/generate/report", post(report_handler))
        .route("/api/generate/valuation", post(valuation_handler))
        .route("/api/generate/assistant", post(assistant_handler))
        .route(
            "/api/analyses",
            get(list_analyses_handler).post(create_analysis_handler),
        )
        .route("/api/analyses/hybrid", post(hybrid_analysis_handler))
        .route("/api/analyses/{id}", get(get_analysis_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors_layer(&state.config.cors_origin))
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
