use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Fixed one-second window shared by the whole API surface. Requests over
/// the budget get a 429 without touching the store.
#[derive(Clone, Debug)]
pub struct ApiRateLimit {
    budget: u32,
    window: Arc<Mutex<Window>>,
}

#[derive(Debug)]
struct Window {
    opened: Instant,
    used: u32,
}

impl ApiRateLimit {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            budget: requests_per_second.max(1),
            window: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                used: 0,
            })),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().expect("rate limit mutex poisoned");
        if window.opened.elapsed() >= Duration::from_secs(1) {
            window.opened = Instant::now();
            window.used = 0;
        }
        if window.used < self.budget {
            window.used += 1;
            true
        } else {
            false
        }
    }
}

pub async fn rate_limit_middleware(
    State(limit): State<ApiRateLimit>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limit.try_acquire() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_enforced_within_a_window() {
        let limit = ApiRateLimit::new(3);
        assert!(limit.try_acquire());
        assert!(limit.try_acquire());
        assert!(limit.try_acquire());
        assert!(!limit.try_acquire());
    }
}
