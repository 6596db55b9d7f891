use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window shared by every request on the router it guards.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    window: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            window: Arc::new(Mutex::new(WindowState {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    /// `Ok` when admitted, otherwise the time left in the current window.
    fn check(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut guard = match self.window.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let elapsed = now.duration_since(guard.start);
        if elapsed >= Duration::from_secs(1) {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.rps {
            guard.count += 1;
            Ok(())
        } else {
            Err(Duration::from_secs(1).saturating_sub(now.duration_since(guard.start)))
        }
    }
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Err(wait) = state.check() {
        let retry_after = wait.as_secs_f64().ceil().max(1.0) as u64;
        tracing::warn!(path = %req.uri().path(), retry_after, "Rate limit exceeded");
        let mut resp = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "rate_limit_exceeded"})),
        )
            .into_response();
        resp.headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        return resp;
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, routing::get, Router};
    use tower::ServiceExt;

    fn app(rps: u32) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(
                new_rps_state(rps),
                rps_middleware,
            ))
    }

    #[test]
    fn admits_up_to_the_limit_per_window() {
        let limiter = new_rps_state(2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        let wait = limiter.check().unwrap_err();
        assert!(wait <= Duration::from_secs(1));
    }

    #[test]
    fn zero_is_treated_as_one() {
        let limiter = new_rps_state(0);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[tokio::test]
    async fn over_limit_answers_429_with_retry_after() {
        let app = app(1);

        let first = app
            .clone()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers()[header::RETRY_AFTER], "1");
        let bytes = to_bytes(second.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "rate_limit_exceeded");
    }
}
