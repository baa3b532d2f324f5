use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use schoolgate_application::RateLimitRule;

use crate::state::AppState;
use crate::{auth, middleware};

pub(super) fn build_public_auth_routes(app_state: AppState) -> Router<AppState> {
    let passcode_routes = Router::new()
        .route("/auth/passcode", post(auth::passcode_sign_in_handler))
        .route_layer(from_fn_with_state(app_state, middleware::rate_limit))
        .layer(axum::Extension(RateLimitRule::passcode_sign_in()));

    Router::new()
        .merge(passcode_routes)
        .route("/auth/federated", post(auth::federated_sign_in_handler))
        .route("/auth/logout", post(auth::logout_handler))
}
