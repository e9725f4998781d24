//! Global request rate limit
//!
//! One GCRA bucket shared by every client, refilled at `per_minute`
//! requests per minute with a burst of the same size.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use super::response::{ApiResponse, RATE_LIMITED};

pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Build a limiter allowing `per_minute` requests per minute (at least one)
pub fn global_limiter(per_minute: u32) -> Arc<GlobalLimiter> {
    let per_minute = NonZeroU32::MIN.saturating_add(per_minute.saturating_sub(1));
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// Reject the request with 429 once the bucket is empty
pub async fn rate_limit(
    State(limiter): State<Arc<GlobalLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(request).await,
        Err(not_until) => {
            let retry_after = not_until.wait_time_from(DefaultClock::default().now());
            tracing::warn!(
                "Rate limit exceeded for {} {}, retry in {:?}",
                request.method(),
                request.uri(),
                retry_after
            );
            let mut response = ApiResponse::failure(RATE_LIMITED, "too many requests")
                .with_status(StatusCode::TOO_MANY_REQUESTS);
            // round up so clients never retry early
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}
