//! Whole-response caching for GET endpoints.
//!
//! Wrap a route with
//! `axum::middleware::from_fn_with_state(ResponseCache::new(..), cache_response)`.
//! The key is `<prefix>:<original path and query>`, so nesting does not
//! change it and every query string gets its own entry.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{OriginalUri, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use pinboard_core::cache::response_key;

use super::CacheService;

/// State for [`cache_response`]: where and for how long to keep responses.
#[derive(Clone)]
pub struct ResponseCache {
    cache: CacheService,
    prefix: &'static str,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(cache: CacheService, prefix: &'static str, ttl: Duration) -> Self {
        Self { cache, prefix, ttl }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Serves GET requests from the cache, populating it on a miss.
///
/// Only 2xx JSON responses are stored. The client observes the same status,
/// headers and body whether or not the response was intercepted.
pub async fn cache_response(
    State(state): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if *request.method() != Method::GET {
        return next.run(request).await;
    }

    let target = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    let path_and_query = target
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| target.path());
    let key = response_key(state.prefix, path_and_query);

    match state.cache.get_raw(&key).await {
        Ok(Some(bytes)) => {
            tracing::trace!(%key, "Response cache hit");
            return (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                bytes,
            )
                .into_response();
        }
        Ok(None) => tracing::trace!(%key, "Response cache miss"),
        Err(err) => tracing::warn!(%key, error = %err, "Response cache read failed"),
    }

    let response = next.run(request).await;
    if !response.status().is_success() || !is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%key, error = %err, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Err(err) = state.cache.set_raw(&key, &bytes, Some(state.ttl)).await {
        tracing::warn!(%key, error = %err, "Failed to cache response");
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        http::Request as HttpRequest,
        middleware::from_fn_with_state,
        routing::get,
        Json, Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::cache::{service::test_support::FailingCache, MemoryCache};

    fn router(cache: CacheService, hits: Arc<AtomicUsize>) -> Router {
        let counted = {
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(serde_json::json!({ "status": "success", "call": n }))
                }
            }
        };
        let missing = move || async move {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "status": "fail" })),
            )
        };

        let inner = Router::new()
            .route("/things/{id}", get(counted).post(|| async { "posted" }))
            .route("/missing", get(missing))
            .route_layer(from_fn_with_state(
                ResponseCache::new(cache, "things", Duration::from_secs(60)),
                cache_response,
            ));
        Router::new().nest("/api", inner)
    }

    fn memory_service() -> CacheService {
        CacheService::new(Arc::new(MemoryCache::new(100)), Duration::from_secs(60))
    }

    async fn get_body(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(HttpRequest::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let cache = memory_service();
        let app = router(cache.clone(), hits.clone());

        let first = get_body(&app, "/api/things/1?page=2").await;
        let second = get_body(&app, "/api/things/1?page=2").await;

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Key uses the full original path and query
        let stored = cache.get_raw("things:/api/things/1?page=2").await.unwrap();
        assert_eq!(stored, Some(first.1));
    }

    #[tokio::test]
    async fn test_different_query_is_a_different_entry() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = router(memory_service(), hits.clone());

        get_body(&app, "/api/things/1?page=1").await;
        get_body(&app, "/api/things/1?page=2").await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_responses_are_not_cached() {
        let cache = memory_service();
        let app = router(cache.clone(), Arc::new(AtomicUsize::new(0)));

        let (status, _) = get_body(&app, "/api/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(cache.get_raw("things:/api/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_passes_through() {
        let cache = memory_service();
        let app = router(cache.clone(), Arc::new(AtomicUsize::new(0)));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/things/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cache.get_raw("things:/api/things/1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_cache_still_serves() {
        let hits = Arc::new(AtomicUsize::new(0));
        let cache = CacheService::new(Arc::new(FailingCache), Duration::from_secs(60));
        let app = router(cache, hits.clone());

        let (status, body) = get_body(&app, "/api/things/1").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["call"], 1);
    }
}
