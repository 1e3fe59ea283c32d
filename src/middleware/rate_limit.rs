use crate::common::error::AppError;
use crate::middleware::identity::identity_from;
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window admission control, one timestamp window per client
/// identity. Constructed once at startup and handed around through
/// `AppState`; state is process-local and resets on restart.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    limit: usize,
}

impl RateLimiter {
    /// A limit of zero or below disables gating entirely.
    pub fn new(limit_per_minute: i64) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            limit: limit_per_minute.max(0) as usize,
        }
    }

    pub fn check(&self, identity: &str) -> Result<(), AppError> {
        self.check_at(identity, Instant::now())
    }

    fn check_at(&self, identity: &str, now: Instant) -> Result<(), AppError> {
        if self.limit == 0 {
            return Ok(());
        }

        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let window = windows.entry(identity.to_string()).or_default();
        window.retain(|ts| now.duration_since(*ts) < WINDOW);
        if window.len() >= self.limit {
            return Err(AppError::RateLimitExceeded);
        }
        window.push(now);
        Ok(())
    }
}

/// Gate applied as a `route_layer` on job-creating and upload routes. Runs
/// before any side effect; a rejected call leaves no partial state.
pub async fn admission_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req.extensions().get::<ConnectInfo<SocketAddr>>();
    let identity = identity_from(req.headers(), peer);

    if let Err(e) = state.limiter.check(&identity) {
        warn!("rate limit exceeded for {}", identity);
        return Err(e);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_rejects_excess_within_window() {
        let limiter = RateLimiter::new(3);
        let now = Instant::now();
        for _ in 0..3 {
            limiter.check_at("c1", now).unwrap();
        }
        let err = limiter.check_at("c1", now + Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded));
    }

    #[test]
    fn window_elapse_admits_again() {
        let limiter = RateLimiter::new(2);
        let now = Instant::now();
        limiter.check_at("c1", now).unwrap();
        limiter.check_at("c1", now).unwrap();
        assert!(limiter.check_at("c1", now).is_err());
        limiter.check_at("c1", now + Duration::from_secs(61)).unwrap();
    }

    #[test]
    fn identities_are_independent() {
        let limiter = RateLimiter::new(1);
        let now = Instant::now();
        limiter.check_at("c1", now).unwrap();
        limiter.check_at("c2", now).unwrap();
        assert!(limiter.check_at("c1", now).is_err());
    }

    #[test]
    fn non_positive_limit_disables_gating() {
        let limiter = RateLimiter::new(0);
        let now = Instant::now();
        for _ in 0..1000 {
            limiter.check_at("c1", now).unwrap();
        }
    }
}
