//! Rate limiting middleware
//!
//! A single process-wide quota protects the API from runaway clients.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{Quota, RateLimiter};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{direct::NotKeyed, InMemoryState};
use tracing::debug;

use crate::utils::errors::ChurchHubError;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Global request quota
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Option<Arc<DirectLimiter>>,
}

impl RateLimitMiddleware {
    /// `per_minute == 0` disables limiting
    pub fn new(per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(per_minute)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_minute(rate))));

        Self { limiter }
    }

    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    /// Take one request from the quota
    pub fn check(&self) -> Result<(), ChurchHubError> {
        match &self.limiter {
            Some(limiter) => limiter.check().map_err(|_| ChurchHubError::RateLimitExceeded),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware")
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

/// Reject requests over the quota with 429
pub async fn rate_limit(
    State(limiter): State<RateLimitMiddleware>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = limiter.check() {
        debug!(path = %request.uri().path(), "Rate limit hit");
        return e.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exhausts() {
        let limiter = RateLimitMiddleware::new(2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(matches!(limiter.check(), Err(ChurchHubError::RateLimitExceeded)));
    }

    #[test]
    fn test_disabled() {
        let limiter = RateLimitMiddleware::new(0);
        for _ in 0..1000 {
            assert!(limiter.check().is_ok());
        }
        assert!(RateLimitMiddleware::disabled().check().is_ok());
    }
}
