use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use schoolgate_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;
mod public_auth;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/access/features",
            get(handlers::access::list_feature_access_handler),
        )
        .route(
            "/api/access/features/{feature}",
            get(handlers::access::feature_access_handler),
        )
        .route(
            "/api/access/features/{feature}/records",
            get(handlers::access::record_access_handler),
        )
        .route(
            "/api/access/schools",
            get(handlers::access::school_scope_handler),
        )
        .route(
            "/api/access/schools/{school_code}",
            get(handlers::access::school_access_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(public_auth::build_public_auth_routes(app_state.clone()))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
