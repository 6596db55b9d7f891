use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
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

impl Interview {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.recruiter_id == user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Pending,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    /// Pending and completed interviews both hold the candidate/offer pair.
    pub fn is_active(self) -> bool {
        matches!(self, InterviewStatus::Pending | InterviewStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Pending => "pending",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    #[serde(alias = "en ligne")]
    Online,
    #[serde(alias = "présentiel", alias = "presentiel")]
    Onsite,
}

impl InterviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewType::Online => "online",
            InterviewType::Onsite => "onsite",
        }
    }
}

/// Everything needed to place (or re-place) an interview for a candidate/offer pair.
#[derive(Debug, Clone)]
pub struct InterviewDraft {
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub recruiter_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub candidate_last_name: String,
    pub candidate_first_name: String,
    pub candidate_email: String,
    pub position: String,
    pub interview_type: InterviewType,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    Created(Interview),
    /// A cancelled record for the pair was brought back to `pending`.
    Reused(Interview),
    /// The pair already holds a pending or completed interview.
    Conflict(Interview),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_type_labels_are_accepted() {
        let online: InterviewType = serde_json::from_str("\"en ligne\"").unwrap();
        let onsite: InterviewType = serde_json::from_str("\"présentiel\"").unwrap();
        assert_eq!(online, InterviewType::Online);
        assert_eq!(onsite, InterviewType::Onsite);
        assert!(serde_json::from_str::<InterviewType>("\"hybrid\"").is_err());
    }

    #[test]
    fn only_cancelled_releases_the_pair() {
        assert!(InterviewStatus::Pending.is_active());
        assert!(InterviewStatus::Completed.is_active());
        assert!(!InterviewStatus::Cancelled.is_active());
    }
}
