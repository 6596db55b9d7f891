pub mod health;
pub mod interviews;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;

use crate::middleware::{
    auth::require_bearer_auth,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        interviews::schedule_interview,
        interviews::list_interviews,
        interviews::available_hours,
        interviews::cancel_interview,
        interviews::complete_interview,
        interviews::reschedule_interview,
        interviews::can_schedule_interview,
        interviews::notify_upcoming_interviews,
    ),
    tags(
        (name = "interviews", description = "Interview scheduling")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Public health and OpenAPI routes plus the bearer-protected, rate-limited interview API.
pub fn router(state: AppState, rps: u32) -> Router {
    let interview_api = Router::new()
        .route("/api/interviews", get(interviews::list_interviews))
        .route(
            "/api/interviews/schedule",
            post(interviews::schedule_interview),
        )
        .route(
            "/api/interviews/available-hours",
            post(interviews::available_hours),
        )
        .route(
            "/api/interviews/notify-upcoming",
            post(interviews::notify_upcoming_interviews),
        )
        .route(
            "/api/interviews/can-schedule/:candidate_id",
            get(interviews::can_schedule_interview),
        )
        .route(
            "/api/interviews/:id/cancel",
            post(interviews::cancel_interview),
        )
        .route(
            "/api/interviews/:id/complete",
            post(interviews::complete_interview),
        )
        .route(
            "/api/interviews/:id/reschedule",
            post(interviews::reschedule_interview),
        )
        .route_layer(from_fn(require_bearer_auth))
        .layer(from_fn_with_state(new_rps_state(rps), rps_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .merge(interview_api)
        .with_state(state)
}
