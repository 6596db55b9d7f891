use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::database::interview_store::InterviewStore;
use crate::error::{Error, Result};
use crate::models::email_outbox::{EmailTemplate, OutboundEmail};
use crate::models::interview::{
    Interview, InterviewDraft, InterviewStatus, InterviewType, ScheduleOutcome,
};
use crate::models::notification::NewNotification;
use crate::models::user::CurrentUser;
use crate::services::directory_service::Directory;
use crate::services::notification_service::Notifier;
use crate::utils::time::{day_bounds, hour_minute, Clock};

const DAY_START_MINUTES: u32 = 8 * 60;
const DAY_END_MINUTES: u32 = 18 * 60;
const SLOT_MINUTES: usize = 15;

const REMINDER_LEAD_SECONDS: i64 = 60;
const REMINDER_TOLERANCE_SECONDS: i64 = 30;

#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub candidate_last_name: String,
    pub candidate_first_name: String,
    pub candidate_email: String,
    pub position: String,
    pub interview_type: InterviewType,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Scheduled {
    Created(Interview),
    /// A previously cancelled interview for the same pair was put back on the calendar.
    Rescheduled(Interview),
}

impl Scheduled {
    pub fn interview(&self) -> &Interview {
        match self {
            Scheduled::Created(i) | Scheduled::Rescheduled(i) => i,
        }
    }

    pub fn into_interview(self) -> Interview {
        match self {
            Scheduled::Created(i) | Scheduled::Rescheduled(i) => i,
        }
    }
}

#[derive(Clone)]
pub struct InterviewService {
    store: Arc<dyn InterviewStore>,
    directory: Arc<dyn Directory>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl InterviewService {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            clock,
        }
    }

    pub async fn schedule_interview(
        &self,
        recruiter: &CurrentUser,
        request: ScheduleRequest,
    ) -> Result<Scheduled> {
        if !self.directory.candidate_exists(request.candidate_id).await? {
            return Err(Error::NotFound(format!(
                "Candidate {} not found",
                request.candidate_id
            )));
        }
        if !self.directory.offer_exists(request.offer_id).await? {
            return Err(Error::NotFound(format!("Offer {} not found", request.offer_id)));
        }

        let location = resolve_location(
            request.interview_type,
            request.location,
            recruiter.address.as_deref(),
        );
        let draft = InterviewDraft {
            candidate_id: request.candidate_id,
            offer_id: request.offer_id,
            recruiter_id: recruiter.id,
            scheduled_at: request.scheduled_at,
            candidate_last_name: request.candidate_last_name,
            candidate_first_name: request.candidate_first_name,
            candidate_email: request.candidate_email,
            position: request.position,
            interview_type: request.interview_type,
            location,
        };

        let scheduled = match self.store.schedule(draft).await? {
            ScheduleOutcome::Created(interview) => Scheduled::Created(interview),
            ScheduleOutcome::Reused(interview) => Scheduled::Rescheduled(interview),
            ScheduleOutcome::Conflict(existing) => {
                tracing::info!(
                    interview_id = %existing.id,
                    candidate_id = %existing.candidate_id,
                    offer_id = %existing.offer_id,
                    status = existing.status.as_str(),
                    "Refusing to schedule a second active interview"
                );
                return Err(Error::Conflict(
                    "This candidate already has an interview scheduled for this offer".to_string(),
                ));
            }
        };

        let mut interview = scheduled.interview().clone();
        tracing::info!(
            interview_id = %interview.id,
            recruiter_id = %interview.recruiter_id,
            scheduled_at = %interview.scheduled_at,
            reused = matches!(scheduled, Scheduled::Rescheduled(_)),
            "Interview scheduled"
        );

        let invited = self
            .send_best_effort(&interview, EmailTemplate::InterviewInvitation, json!({}))
            .await;
        if invited {
            match self.store.mark_invitation_sent(interview.id).await {
                Ok(()) => interview.invitation_sent = true,
                Err(e) => tracing::error!(
                    interview_id = %interview.id,
                    error = %e,
                    "Failed to record invitation dispatch"
                ),
            }
        }

        Ok(match scheduled {
            Scheduled::Created(_) => Scheduled::Created(interview),
            Scheduled::Rescheduled(_) => Scheduled::Rescheduled(interview),
        })
    }

    pub async fn list_interviews(&self, recruiter_id: Uuid) -> Result<Vec<Interview>> {
        self.store.list_for_recruiter(recruiter_id).await
    }

    pub async fn cancel_interview(&self, id: Uuid, caller_id: Uuid) -> Result<Interview> {
        let interview = self
            .store
            .update_status(id, caller_id, InterviewStatus::Cancelled)
            .await?;
        let interview = self.owned_or_refused(id, interview).await?;
        tracing::info!(interview_id = %id, "Interview cancelled");

        self.send_best_effort(&interview, EmailTemplate::InterviewCancelled, json!({}))
            .await;
        Ok(interview)
    }

    pub async fn complete_interview(&self, id: Uuid, caller_id: Uuid) -> Result<Interview> {
        let interview = self
            .store
            .update_status(id, caller_id, InterviewStatus::Completed)
            .await?;
        let interview = self.owned_or_refused(id, interview).await?;
        tracing::info!(interview_id = %id, "Interview completed");
        Ok(interview)
    }

    /// Moves an interview to a new date. Slot availability is not re-checked.
    pub async fn reschedule_interview(
        &self,
        id: Uuid,
        caller_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Interview> {
        let previous = self.owned_interview(id, caller_id).await?;
        let interview = self
            .store
            .update_scheduled_at(id, caller_id, scheduled_at)
            .await?;
        let interview = self.owned_or_refused(id, interview).await?;
        tracing::info!(
            interview_id = %id,
            from = %previous.scheduled_at,
            to = %interview.scheduled_at,
            "Interview moved"
        );

        self.send_best_effort(
            &interview,
            EmailTemplate::InterviewRescheduled,
            json!({ "previous_scheduled_at": previous.scheduled_at }),
        )
        .await;
        Ok(interview)
    }

    /// Free `HH:MM` slots of the recruiter's working day. Bookings for every
    /// offer count against the same calendar; `offer_id` only has to exist.
    pub async fn available_hours(
        &self,
        date: NaiveDate,
        offer_id: Uuid,
        recruiter_id: Uuid,
    ) -> Result<Vec<String>> {
        if !self.directory.offer_exists(offer_id).await? {
            return Err(Error::NotFound(format!("Offer {} not found", offer_id)));
        }

        let (from, to) = day_bounds(date);
        let taken: HashSet<String> = self
            .store
            .pending_for_recruiter_between(recruiter_id, from, to)
            .await?
            .iter()
            .map(|i| hour_minute(&i.scheduled_at))
            .collect();

        Ok(working_day_slots()
            .into_iter()
            .filter(|slot| !taken.contains(slot))
            .collect())
    }

    /// Candidate-wide check: any pending or completed interview, whatever the offer.
    pub async fn can_schedule_interview(&self, candidate_id: Uuid) -> Result<bool> {
        Ok(!self.store.candidate_has_active(candidate_id).await?)
    }

    /// Raises an in-app reminder for every interview starting about a minute from now.
    pub async fn notify_upcoming_interviews(&self) -> Result<usize> {
        let target = self.clock.now() + Duration::seconds(REMINDER_LEAD_SECONDS);
        let tolerance = Duration::seconds(REMINDER_TOLERANCE_SECONDS);
        let due = self
            .store
            .claim_reminders(target - tolerance, target + tolerance)
            .await?;

        for interview in &due {
            let notification = NewNotification {
                notification_type: "interview".to_string(),
                message: format!(
                    "Reminder: interview in 1 minute for the position '{}' with candidate {} {}.",
                    interview.position,
                    interview.candidate_last_name,
                    interview.candidate_first_name
                ),
                user_id: interview.recruiter_id,
                data: json!({
                    "interview_id": interview.id,
                    "time": hour_minute(&interview.scheduled_at),
                    "date": interview.scheduled_at.format("%Y-%m-%d").to_string(),
                }),
            };
            if let Err(e) = self.notifier.create_notification(notification).await {
                tracing::error!(
                    interview_id = %interview.id,
                    error = %e,
                    "Failed to create interview reminder"
                );
            }
        }

        if !due.is_empty() {
            tracing::info!(count = due.len(), "Interview reminders raised");
        }
        Ok(due.len())
    }

    async fn owned_interview(&self, id: Uuid, caller_id: Uuid) -> Result<Interview> {
        let interview = self.store.find(id).await?.filter(|i| i.is_owned_by(caller_id));
        self.owned_or_refused(id, interview).await
    }

    /// Passes through the caller's interview. Otherwise tells a missing
    /// record (404) apart from one owned by someone else (403).
    async fn owned_or_refused(&self, id: Uuid, interview: Option<Interview>) -> Result<Interview> {
        if let Some(interview) = interview {
            return Ok(interview);
        }
        match self.store.find(id).await? {
            Some(_) => Err(Error::Forbidden(
                "Only the recruiter who scheduled this interview can change it".to_string(),
            )),
            None => Err(Error::NotFound(format!("Interview {} not found", id))),
        }
    }

    /// Hands an email about `interview` to the notifier; failures are logged, never raised.
    async fn send_best_effort(
        &self,
        interview: &Interview,
        template: EmailTemplate,
        extra: JsonValue,
    ) -> bool {
        let email = OutboundEmail {
            template,
            recipient: interview.candidate_email.clone(),
            subject: template.subject_for(&interview.position),
            data: email_data(interview, extra),
        };
        match self.notifier.send_email(email).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    interview_id = %interview.id,
                    template = template.as_str(),
                    error = %e,
                    "Failed to send interview email"
                );
                false
            }
        }
    }
}

fn email_data(interview: &Interview, extra: JsonValue) -> JsonValue {
    let mut data = json!({
        "interview_id": interview.id,
        "candidate_first_name": interview.candidate_first_name,
        "candidate_last_name": interview.candidate_last_name,
        "position": interview.position,
        "scheduled_at": interview.scheduled_at,
        "type": interview.interview_type.as_str(),
        "location": interview.location,
        "recruiter_id": interview.recruiter_id,
    });
    if let (Some(base), JsonValue::Object(extra)) = (data.as_object_mut(), extra) {
        base.extend(extra);
    }
    data
}

/// Online interviews keep whatever link was given; onsite ones fall back to
/// the recruiter's registered address.
pub fn resolve_location(
    interview_type: InterviewType,
    supplied: Option<String>,
    recruiter_address: Option<&str>,
) -> Option<String> {
    let supplied = supplied.filter(|s| !s.trim().is_empty());
    match interview_type {
        InterviewType::Online => supplied,
        InterviewType::Onsite => supplied.or_else(|| recruiter_address.map(str::to_string)),
    }
}

/// The 15-minute grid from 08:00 up to, not including, 18:00.
pub fn working_day_slots() -> Vec<String> {
    (DAY_START_MINUTES..DAY_END_MINUTES)
        .step_by(SLOT_MINUTES)
        .map(|m| format!("{:02}:{:02}", m / 60, m % 60))
        .collect()
}
