//! Application router configuration.

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    auth::{auth_gateway, post_log_in, post_log_out, register_user},
    endpoints,
    frontend::frontend_service,
    graphql::{get_graphiql, graphql_handler},
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
///
/// Requests to the GraphQL API pass through the auth gateway, which identifies
/// the caller from the auth cookie, and may come with credentials from the
/// configured CORS origin. Paths that do not match a route are served from the
/// frontend directory without request logging.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let graphql_routes = Router::new()
        .route(endpoints::GRAPHQL, get(get_graphiql).post(graphql_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gateway))
        .layer(cors);

    let account_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    graphql_routes
        .merge(account_routes)
        .layer(middleware::from_fn(logging_middleware))
        .fallback_service(frontend_service(&state.frontend_dir))
        .with_state(state)
}
