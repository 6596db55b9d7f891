use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use reqwest::Client;
use serde_json::json;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::email_outbox::{OutboundEmail, OutboxEmail};
use crate::models::notification::{NewNotification, Notification};

/// Outbound side effects of scheduling: candidate emails and in-app notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, email: OutboundEmail) -> Result<()>;

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;
}

/// Writes emails to the `email_outbox` table; `EmailOutboxWorker` delivers them.
#[derive(Clone)]
pub struct OutboxNotifier {
    pool: PgPool,
    max_attempts: i32,
}

impl OutboxNotifier {
    pub fn new(pool: PgPool, max_attempts: i32) -> Self {
        Self {
            pool,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send_email(&self, email: OutboundEmail) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO email_outbox (template, recipient, subject, payload, status, max_attempts)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            "#,
        )
        .bind(email.template.as_str())
        .bind(&email.recipient)
        .bind(&email.subject)
        .bind(&email.data)
        .bind(self.max_attempts)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (notification_type, message, read, user_id, data)
            VALUES ($1, $2, FALSE, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&notification.notification_type)
        .bind(&notification.message)
        .bind(notification.user_id)
        .bind(&notification.data)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[derive(Debug, Clone)]
pub struct MailRelay {
    pub url: String,
    pub token: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Clone)]
pub struct EmailOutboxWorker {
    pool: PgPool,
    client: Client,
    relay: MailRelay,
}

impl EmailOutboxWorker {
    pub fn new(pool: PgPool, relay: MailRelay) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            pool,
            client,
            relay,
        })
    }

    /// Puts back rows left in `sending` by a worker that died mid-delivery.
    pub async fn requeue_stalled(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE email_outbox SET status = 'pending', updated_at = NOW()
            WHERE status = 'sending' AND updated_at < NOW() - INTERVAL '5 minutes'
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delivers at most one due email. Returns `false` when nothing was due.
    pub async fn run_once(&self) -> Result<bool> {
        let claimed = sqlx::query_as::<_, OutboxEmail>(
            r#"
            UPDATE email_outbox SET status = 'sending', updated_at = NOW()
            WHERE id = (
                SELECT id FROM email_outbox
                WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(email) = claimed else { return Ok(false) };
        self.deliver(email).await?;
        Ok(true)
    }

    async fn deliver(&self, email: OutboxEmail) -> Result<()> {
        let body = json!({
            "from": { "address": self.relay.from_address, "name": self.relay.from_name },
            "to": email.recipient,
            "subject": email.subject,
            "template": email.template,
            "data": email.payload,
        });

        let mut request = self.client.post(&self.relay.url).json(&body);
        if let Some(token) = &self.relay.token {
            request = request.bearer_auth(token);
        }

        let (http_status, error) = match request.send().await {
            Ok(resp) if resp.status().is_success() => (Some(resp.status().as_u16() as i32), None),
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                let text = resp.text().await.unwrap_or_default();
                (Some(status), Some(format!("relay answered {}: {}", status, text)))
            }
            Err(err) => (None, Some(err.to_string())),
        };

        let attempts = email.attempts + 1;
        match error {
            None => {
                sqlx::query(
                    r#"
                    UPDATE email_outbox
                    SET status = 'sent', http_status = $2, attempts = $3, last_error = NULL, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(email.id)
                .bind(http_status)
                .bind(attempts)
                .execute(&self.pool)
                .await?;
                tracing::info!(email_id = %email.id, template = %email.template, "Email delivered");
            }
            Some(error) => {
                let exhausted = attempts >= email.max_attempts;
                let next_retry_at = (!exhausted).then(|| Utc::now() + retry_delay(attempts));
                sqlx::query(
                    r#"
                    UPDATE email_outbox
                    SET status = $2, http_status = $3, attempts = $4, last_error = $5,
                        next_retry_at = $6, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(email.id)
                .bind(if exhausted { "failed" } else { "pending" })
                .bind(http_status)
                .bind(attempts)
                .bind(&error)
                .bind(next_retry_at)
                .execute(&self.pool)
                .await?;
                tracing::warn!(
                    email_id = %email.id,
                    attempts,
                    exhausted,
                    error = %error,
                    "Email delivery failed"
                );
            }
        }
        Ok(())
    }
}

/// Exponential backoff from 30s, capped at an hour, with up to 10s of jitter.
pub fn retry_delay(attempts: i32) -> Duration {
    let exponent = (attempts - 1).clamp(0, 16) as u32;
    let base = 30i64.saturating_mul(1i64 << exponent).min(3600);
    let jitter = rand::thread_rng().gen_range(0..=10);
    Duration::seconds(base + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_grows_then_caps() {
        let first = retry_delay(1).num_seconds();
        assert!((30..=40).contains(&first));

        let third = retry_delay(3).num_seconds();
        assert!((120..=130).contains(&third));

        let late = retry_delay(12).num_seconds();
        assert!((3600..=3610).contains(&late));
    }

    #[tokio::test]
    async fn worker_builds_its_relay_client() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let relay = MailRelay {
            url: "http://localhost:8025/send".into(),
            token: None,
            from_address: "noreply@example.com".into(),
            from_name: "Recruitment".into(),
        };
        assert!(EmailOutboxWorker::new(pool, relay).is_ok());
    }

    #[test]
    fn retry_delay_tolerates_odd_attempt_counts() {
        assert!(retry_delay(0).num_seconds() >= 30);
        assert!(retry_delay(i32::MAX).num_seconds() <= 3610);
    }
}
