use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        AvailableHoursPayload, AvailableHoursResponse, CanScheduleResponse, InterviewEnvelope,
        InterviewListResponse, NotifyUpcomingResponse, ReschedulePayload, SchedulePayload,
    },
    error::Result,
    models::user::CurrentUser,
    services::interview_service::Scheduled,
    utils::validation::{ApiJson, ApiPath},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/interviews/schedule",
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Json<InterviewEnvelope>),
        (status = 200, description = "Cancelled interview put back on the calendar", body = Json<InterviewEnvelope>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate or offer not found"),
        (status = 409, description = "Candidate already has an interview for this offer")
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<SchedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let request = payload.into_request()?;
    let scheduled = state
        .interview_service
        .schedule_interview(&user, request)
        .await?;

    let (status, message) = match scheduled {
        Scheduled::Created(_) => (StatusCode::CREATED, "Interview scheduled successfully"),
        Scheduled::Rescheduled(_) => (StatusCode::OK, "Interview rescheduled successfully"),
    };
    Ok((
        status,
        Json(InterviewEnvelope::new(message, scheduled.into_interview())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/interviews",
    responses(
        (status = 200, description = "Interviews of the caller, earliest first", body = Json<InterviewListResponse>)
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse> {
    let interviews = state.interview_service.list_interviews(user.id).await?;
    Ok(Json(InterviewListResponse::from(interviews)))
}

#[utoipa::path(
    post,
    path = "/api/interviews/available-hours",
    request_body = AvailableHoursPayload,
    responses(
        (status = 200, description = "Free 15-minute slots between 08:00 and 18:00", body = Json<AvailableHoursResponse>),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Offer not found")
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn available_hours(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<AvailableHoursPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let day = payload.day()?;
    let available_hours = state
        .interview_service
        .available_hours(day, payload.offer_id, user.id)
        .await?;
    Ok(Json(AvailableHoursResponse {
        date: payload.date,
        offer_id: payload.offer_id,
        available_hours,
    }))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview cancelled", body = Json<InterviewEnvelope>),
        (status = 403, description = "Caller does not own the interview"),
        (status = 404, description = "Interview not found")
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.cancel_interview(id, user.id).await?;
    Ok(Json(InterviewEnvelope::new(
        "Interview cancelled successfully",
        interview,
    )))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview marked as completed", body = Json<InterviewEnvelope>),
        (status = 403, description = "Caller does not own the interview"),
        (status = 404, description = "Interview not found")
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn complete_interview(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let interview = state
        .interview_service
        .complete_interview(id, user.id)
        .await?;
    Ok(Json(InterviewEnvelope::new(
        "Interview marked as completed",
        interview,
    )))
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/reschedule",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = ReschedulePayload,
    responses(
        (status = 200, description = "Interview moved", body = Json<InterviewEnvelope>),
        (status = 400, description = "Invalid date-time"),
        (status = 403, description = "Caller does not own the interview"),
        (status = 404, description = "Interview not found")
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReschedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let scheduled_at = payload.scheduled_at()?;
    let interview = state
        .interview_service
        .reschedule_interview(id, user.id, scheduled_at)
        .await?;
    Ok(Json(InterviewEnvelope::new(
        "Interview rescheduled successfully",
        interview,
    )))
}

#[utoipa::path(
    get,
    path = "/api/interviews/can-schedule/{candidate_id}",
    params(
        ("candidate_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Whether a new interview may be scheduled", body = Json<CanScheduleResponse>)
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn can_schedule_interview(
    State(state): State<AppState>,
    ApiPath(candidate_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let can_schedule = state
        .interview_service
        .can_schedule_interview(candidate_id)
        .await?;
    Ok(Json(CanScheduleResponse::new(can_schedule)))
}

#[utoipa::path(
    post,
    path = "/api/interviews/notify-upcoming",
    responses(
        (status = 200, description = "Reminders raised for interviews starting in about a minute", body = Json<NotifyUpcomingResponse>)
    ),
    tag = "interviews"
)]
#[axum::debug_handler]
pub async fn notify_upcoming_interviews(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let notified = state.interview_service.notify_upcoming_interviews().await?;
    Ok(Json(NotifyUpcomingResponse {
        message: format!("{} reminder(s) sent", notified),
        notified,
    }))
}
