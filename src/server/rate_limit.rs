//! Governor-based rate limiting for the `/api` routes.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use super::response::ApiResponse;
use super::AppContext;

/// A shared rate limiter instance.
pub type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Allow `max_requests` per `window`, refilled evenly across the window.
pub fn create_limiter(window: Duration, max_requests: u32) -> SharedLimiter {
    let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
    let period = (window / burst.get()).max(Duration::from_nanos(1));

    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware. Returns 429 Too Many Requests when exceeded.
pub async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    if ctx.limiter.check().is_err() {
        tracing::warn!("Rate limit exceeded for {}", request.uri().path());
        return (
            StatusCode::TOO_MANY_REQUESTS,
            ApiResponse::<()>::error("Too many requests, please try again later"),
        )
            .into_response();
    }

    next.run(request).await
}
