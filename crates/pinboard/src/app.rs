use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use pinboard_core::cache::BOARDS_RESPONSE_PREFIX;

use crate::{
    cache::{cache_response, ResponseCache},
    config::Config,
    context::USER_ID_HEADER,
    handlers::{
        boards::{create_board, list_user_boards},
        comments::{add_comment, list_comments},
        health::{healthz, livez},
        images::{get_variant, list_variants},
        pins::{create_pin, get_pin, interaction_check, like_pin, list_pins, save_pin},
        users::{follow, profile, register},
    },
    rate_limit::{rate_limit, RateLimiter},
    state::AppState,
};

/// CORS for the API: the configured frontend origin, or any origin.
fn cors(config: &Config) -> CorsLayer {
    let origin = match config
        .frontend_url
        .as_deref()
        .map(HeaderValue::from_str)
    {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "Invalid FRONTEND_URL, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let api_limiter = RateLimiter::per_ip(
        state.cache.clone(),
        "api",
        config.api_rate_limit(),
        config.trust_proxy,
    );
    let create_limiter = RateLimiter::per_user(
        state.cache.clone(),
        "create",
        config.create_rate_limit(),
        config.trust_proxy,
    );
    let boards_cache = ResponseCache::new(
        state.cache.clone(),
        BOARDS_RESPONSE_PREFIX,
        config.cache_ttl(),
    );

    let api_routes = Router::new()
        // Pin routes
        .route(
            "/pins",
            get(list_pins).post(create_pin.layer(from_fn_with_state(create_limiter, rate_limit))),
        )
        .route("/pins/{id}", get(get_pin))
        .route("/pins/{id}/like", post(like_pin))
        .route("/pins/{id}/save", post(save_pin))
        .route("/pins/interaction-check/{id}", get(interaction_check))
        // Comment routes
        .route(
            "/comments/pin/{pin_id}",
            get(list_comments).post(add_comment),
        )
        // Board routes
        .route("/boards", post(create_board))
        .route(
            "/boards/user/{user_id}",
            get(list_user_boards).route_layer(from_fn_with_state(boards_cache, cache_response)),
        )
        // User routes
        .route("/users/register", post(register))
        .route("/users/{username}", get(profile))
        .route("/users/{username}/follow", post(follow))
        // Image routes
        .route("/images/{file_id}", get(list_variants))
        .route("/images/{file_id}/{variant}", get(get_variant))
        .layer(from_fn_with_state(api_limiter, rate_limit))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors(&config));

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .with_state(state)
}
