//! Per-IP rate limiting for the API
//!
//! Each peer address gets a token bucket. Fetches are expensive (every one
//! spawns the engine twice), so the limiter is usually enabled on public
//! deployments, with `/health` and `/events` exempt.

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Instant,
};
use tokio::sync::Mutex;

/// Bucket count above which idle, fully refilled buckets are dropped
const PRUNE_THRESHOLD: usize = 1024;

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, rate: f64, capacity: u32, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity as f64);
        self.last_refill = now;
    }

    /// Take one token, or report how many whole seconds until one is available
    fn try_consume(&mut self, rate: f64, capacity: u32) -> Result<(), u64> {
        self.refill(rate, capacity, Instant::now());

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(((1.0 - self.tokens) / rate).ceil().max(1.0) as u64)
        }
    }
}

/// Token bucket rate limiter keyed by peer IP
pub struct RateLimiter {
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn is_path_exempt(&self, path: &str) -> bool {
        self.config
            .exempt_paths
            .iter()
            .any(|exempt| path == exempt || path.starts_with(&format!("{exempt}/")))
    }

    /// Check one request
    ///
    /// Returns `Err(retry_after_seconds)` when the peer is over its limit.
    pub async fn check(&self, path: &str, ip: IpAddr) -> Result<(), u64> {
        if self.is_path_exempt(path) || self.config.exempt_ips.contains(&ip) {
            return Ok(());
        }

        let rate = self.config.requests_per_second as f64;
        let capacity = self.config.burst_size;

        let mut buckets = self.buckets.lock().await;

        if buckets.len() >= PRUNE_THRESHOLD {
            let now = Instant::now();
            buckets.retain(|_, bucket| {
                bucket.refill(rate, capacity, now);
                bucket.tokens < capacity as f64
            });
        }

        buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::full(capacity))
            .try_consume(rate, capacity)
    }
}

/// Rate limiting middleware function
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    match limiter.check(req.uri().path(), addr.ip()).await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::debug!(peer = %addr, path = req.uri().path(), retry_after, "Rate limited");

            let error = ApiError::with_details(
                "rate_limited",
                "Too many requests",
                serde_json::json!({ "retry_after_seconds": retry_after }),
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(error)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
