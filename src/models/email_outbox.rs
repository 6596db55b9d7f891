use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `email_outbox` table drained by the delivery worker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboxEmail {
    pub id: Uuid,
    pub template: String,
    pub recipient: String,
    pub subject: String,
    pub payload: JsonValue,
    pub status: String,
    pub http_status: Option<i32>,
    pub last_error: Option<String>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    InterviewInvitation,
    InterviewCancelled,
    InterviewRescheduled,
}

impl EmailTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            EmailTemplate::InterviewInvitation => "interview_invitation",
            EmailTemplate::InterviewCancelled => "interview_cancelled",
            EmailTemplate::InterviewRescheduled => "interview_rescheduled",
        }
    }

    pub fn subject_for(self, position: &str) -> String {
        match self {
            EmailTemplate::InterviewInvitation => {
                format!("Invitation to an interview for the position of {}", position)
            }
            EmailTemplate::InterviewCancelled => {
                format!("Cancellation of your interview for the position of {}", position)
            }
            EmailTemplate::InterviewRescheduled => {
                format!("New date for your interview for the position of {}", position)
            }
        }
    }
}

/// An email handed to the notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub template: EmailTemplate,
    pub recipient: String,
    pub subject: String,
    pub data: JsonValue,
}
