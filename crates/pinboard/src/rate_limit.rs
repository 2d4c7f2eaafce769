//! Fixed-window rate limiting over the shared cache.
//!
//! Counters live in the cache (`Cache::increment`), so every worker and,
//! with the Redis backend, every instance shares them. A cache failure
//! never rejects a request: the limiter fails open and logs.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use pinboard_core::cache::rate_limit_key;
use pinboard_core::domain::{first_forwarded_hop, RateLimitPolicy, RATE_LIMIT_MESSAGE};
use pinboard_core::response::{ErrorBody, ResponseStatus};

use crate::cache::CacheService;
use crate::context::user_id_from_headers;

/// What a limiter counts requests against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    ClientIp,
    /// The acting user, or the client IP for anonymous requests.
    User,
}

/// State of one `rate_limit` middleware instance.
#[derive(Clone)]
pub struct RateLimiter {
    cache: CacheService,
    policy: RateLimitPolicy,
    scope: &'static str,
    subject: Subject,
    trust_proxy: bool,
}

impl RateLimiter {
    /// Limits every request per client IP.
    pub fn per_ip(
        cache: CacheService,
        scope: &'static str,
        policy: RateLimitPolicy,
        trust_proxy: bool,
    ) -> Self {
        Self {
            cache,
            policy,
            scope,
            subject: Subject::ClientIp,
            trust_proxy,
        }
    }

    /// Limits every request per acting user.
    pub fn per_user(
        cache: CacheService,
        scope: &'static str,
        policy: RateLimitPolicy,
        trust_proxy: bool,
    ) -> Self {
        Self {
            subject: Subject::User,
            ..Self::per_ip(cache, scope, policy, trust_proxy)
        }
    }

    fn subject_of(&self, request: &Request) -> String {
        if self.subject == Subject::User {
            if let Some(user_id) = user_id_from_headers(request.headers()) {
                return user_id.to_string();
            }
        }

        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        client_ip(request.headers(), peer, self.trust_proxy)
    }
}

/// Client address: the first `x-forwarded-for` hop when proxies are trusted,
/// else the socket peer, else `unknown`.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(first_forwarded_hop);
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(policy: &RateLimitPolicy) -> Response {
    let body = ErrorBody {
        status: ResponseStatus::Error,
        message: RATE_LIMIT_MESSAGE.to_string(),
        error: None,
    };
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    let headers = response.headers_mut();
    headers.insert(
        "retry-after",
        HeaderValue::from(policy.window.as_secs().max(1)),
    );
    headers.insert("x-ratelimit-limit", HeaderValue::from(policy.max));

    response
}

/// Middleware counting the request and answering 429 past the limit.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let subject = limiter.subject_of(&request);
    let key = rate_limit_key(limiter.scope, &subject);

    match limiter.cache.increment(&key, limiter.policy.window).await {
        Ok(count) if limiter.policy.is_exceeded(count) => {
            tracing::warn!(scope = limiter.scope, %subject, count, "Rate limit exceeded");
            too_many_requests(&limiter.policy)
        }
        Ok(_) => next.run(request).await,
        Err(err) => {
            tracing::warn!(scope = limiter.scope, %key, error = %err, "Rate limit check failed, allowing request");
            next.run(request).await
        }
    }
}
