use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewStatus, InterviewType};
use crate::services::interview_service::ScheduleRequest;
use crate::utils::time::{parse_date, parse_date_time};
use crate::utils::validation::{validate_date, validate_date_time};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulePayload {
    #[serde(alias = "candidat_id")]
    pub candidate_id: Uuid,
    #[serde(alias = "offre_id")]
    pub offer_id: Uuid,
    #[serde(alias = "date_heure")]
    #[validate(custom(function = "validate_date_time"))]
    pub scheduled_at: String,
    #[serde(alias = "candidat_nom")]
    #[validate(length(min = 1))]
    pub candidate_last_name: String,
    #[serde(alias = "candidat_prenom")]
    #[validate(length(min = 1))]
    pub candidate_first_name: String,
    #[serde(alias = "candidat_email")]
    #[validate(email)]
    pub candidate_email: String,
    #[serde(alias = "poste")]
    #[validate(length(min = 1))]
    pub position: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    #[serde(default, alias = "lien_ou_adresse")]
    pub location: Option<String>,
}

impl SchedulePayload {
    pub fn into_request(self) -> Result<ScheduleRequest> {
        Ok(ScheduleRequest {
            candidate_id: self.candidate_id,
            offer_id: self.offer_id,
            scheduled_at: date_time_field(&self.scheduled_at)?,
            candidate_last_name: self.candidate_last_name,
            candidate_first_name: self.candidate_first_name,
            candidate_email: self.candidate_email,
            position: self.position,
            interview_type: self.interview_type,
            location: self.location,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReschedulePayload {
    #[serde(alias = "date_heure")]
    #[validate(custom(function = "validate_date_time"))]
    pub scheduled_at: String,
}

impl ReschedulePayload {
    pub fn scheduled_at(&self) -> Result<DateTime<Utc>> {
        date_time_field(&self.scheduled_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AvailableHoursPayload {
    #[validate(custom(function = "validate_date"))]
    pub date: String,
    #[serde(alias = "offre_id")]
    pub offer_id: Uuid,
}

impl AvailableHoursPayload {
    pub fn day(&self) -> Result<chrono::NaiveDate> {
        parse_date(&self.date)
            .ok_or_else(|| Error::BadRequest(format!("Invalid date: {}", self.date)))
    }
}

fn date_time_field(raw: &str) -> Result<DateTime<Utc>> {
    parse_date_time(raw).ok_or_else(|| Error::BadRequest(format!("Invalid date-time: {}", raw)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub recruiter_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub candidate_last_name: String,
    pub candidate_first_name: String,
    pub candidate_email: String,
    pub position: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub location: Option<String>,
    pub status: InterviewStatus,
    pub invitation_sent: bool,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Interview> for InterviewResponse {
    fn from(i: Interview) -> Self {
        Self {
            id: i.id,
            candidate_id: i.candidate_id,
            offer_id: i.offer_id,
            recruiter_id: i.recruiter_id,
            scheduled_at: i.scheduled_at,
            candidate_last_name: i.candidate_last_name,
            candidate_first_name: i.candidate_first_name,
            candidate_email: i.candidate_email,
            position: i.position,
            interview_type: i.interview_type,
            location: i.location,
            status: i.status,
            invitation_sent: i.invitation_sent,
            reminder_sent: i.reminder_sent,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewEnvelope {
    pub message: String,
    pub interview: InterviewResponse,
}

impl InterviewEnvelope {
    pub fn new(message: impl Into<String>, interview: Interview) -> Self {
        Self {
            message: message.into(),
            interview: interview.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewListResponse {
    pub interviews: Vec<InterviewResponse>,
    pub total: usize,
}

impl From<Vec<Interview>> for InterviewListResponse {
    fn from(rows: Vec<Interview>) -> Self {
        let interviews: Vec<InterviewResponse> = rows.into_iter().map(Into::into).collect();
        Self {
            total: interviews.len(),
            interviews,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableHoursResponse {
    pub date: String,
    pub offer_id: Uuid,
    pub available_hours: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanScheduleResponse {
    pub can_schedule: bool,
    pub message: String,
}

impl CanScheduleResponse {
    pub fn new(can_schedule: bool) -> Self {
        let message = if can_schedule {
            "An interview can be scheduled for this candidate"
        } else {
            "This candidate already has a pending or completed interview"
        };
        Self {
            can_schedule,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyUpcomingResponse {
    pub message: String,
    pub notified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_payload_accepts_legacy_field_names() {
        let candidate = Uuid::new_v4();
        let offer = Uuid::new_v4();
        let payload: SchedulePayload = serde_json::from_value(json!({
            "candidat_id": candidate,
            "offre_id": offer,
            "date_heure": "2025-06-01T10:00:00",
            "candidat_nom": "Dupont",
            "candidat_prenom": "Jean",
            "candidat_email": "jean.dupont@example.com",
            "poste": "Web Developer",
            "type": "présentiel",
            "lien_ou_adresse": "Room 4"
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        let request = payload.into_request().unwrap();
        assert_eq!(request.candidate_id, candidate);
        assert_eq!(request.offer_id, offer);
        assert_eq!(request.interview_type, InterviewType::Onsite);
        assert_eq!(request.location.as_deref(), Some("Room 4"));
        assert_eq!(request.scheduled_at.to_rfc3339(), "2025-06-01T10:00:00+00:00");
    }

    #[test]
    fn schedule_payload_rejects_bad_email_and_date() {
        let payload: SchedulePayload = serde_json::from_value(json!({
            "candidate_id": Uuid::new_v4(),
            "offer_id": Uuid::new_v4(),
            "scheduled_at": "next tuesday",
            "candidate_last_name": "Dupont",
            "candidate_first_name": "Jean",
            "candidate_email": "not-an-email",
            "position": "Web Developer",
            "type": "online"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("scheduled_at"));
        assert!(fields.contains_key("candidate_email"));
        assert!(payload.location.is_none());
    }

    #[test]
    fn available_hours_payload_needs_a_plain_date() {
        let ok = AvailableHoursPayload {
            date: "2025-06-01".into(),
            offer_id: Uuid::new_v4(),
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.day().unwrap().to_string(), "2025-06-01");

        let bad = AvailableHoursPayload {
            date: "01/06/2025".into(),
            offer_id: Uuid::new_v4(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn response_uses_type_key() {
        let now = Utc::now();
        let interview = Interview {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            scheduled_at: now,
            candidate_last_name: "Dupont".into(),
            candidate_first_name: "Jean".into(),
            candidate_email: "jean.dupont@example.com".into(),
            position: "Web Developer".into(),
            interview_type: InterviewType::Online,
            location: None,
            status: InterviewStatus::Pending,
            invitation_sent: false,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };
        let body = serde_json::to_value(InterviewEnvelope::new("ok", interview)).unwrap();
        assert_eq!(body["interview"]["type"], "online");
        assert_eq!(body["interview"]["status"], "pending");
        assert_eq!(body["message"], "ok");
    }
}
