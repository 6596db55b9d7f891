use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub read: bool,
    pub user_id: Uuid,
    pub data: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub message: String,
    pub user_id: Uuid,
    pub data: JsonValue,
}
