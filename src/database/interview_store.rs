use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::interview::{Interview, InterviewDraft, InterviewStatus, ScheduleOutcome};

/// Persistence seam for interview records.
///
/// Implementations must make `schedule` atomic per `(candidate_id, offer_id)`:
/// two concurrent calls for a pair with no record end with exactly one
/// `pending` interview and one `ScheduleOutcome::Conflict`.
#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn schedule(&self, draft: InterviewDraft) -> Result<ScheduleOutcome>;

    async fn find(&self, id: Uuid) -> Result<Option<Interview>>;

    /// Sets the status of an interview owned by `recruiter_id`.
    /// `None` when no such interview belongs to that recruiter.
    async fn update_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<Interview>>;

    /// Moves an interview owned by `recruiter_id` and re-arms its reminder.
    async fn update_scheduled_at(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Option<Interview>>;

    async fn mark_invitation_sent(&self, id: Uuid) -> Result<()>;

    /// All interviews owned by the recruiter, earliest first.
    async fn list_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Interview>>;

    /// Pending interviews of the recruiter with `from <= scheduled_at < to`, any offer.
    async fn pending_for_recruiter_between(
        &self,
        recruiter_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interview>>;

    /// Whether the candidate holds a pending or completed interview for any offer.
    async fn candidate_has_active(&self, candidate_id: Uuid) -> Result<bool>;

    /// Flags `reminder_sent` on every unreminded interview in `[from, to]` and returns them.
    async fn claim_reminders(&self, from: DateTime<Utc>, to: DateTime<Utc>)
        -> Result<Vec<Interview>>;
}

#[derive(Clone)]
pub struct PgInterviewStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UpsertedInterview {
    #[sqlx(flatten)]
    interview: Interview,
    inserted: bool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn schedule(&self, draft: InterviewDraft) -> Result<ScheduleOutcome> {
        // The unique (candidate_id, offer_id) index turns the lookup and the
        // create-or-revive into one statement; an active row yields no RETURNING.
        let upserted = sqlx::query_as::<_, UpsertedInterview>(
            r#"
            INSERT INTO interviews (
                id, candidate_id, offer_id, recruiter_id, scheduled_at,
                candidate_last_name, candidate_first_name, candidate_email, position,
                interview_type, location, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
            ON CONFLICT (candidate_id, offer_id) DO UPDATE SET
                recruiter_id = EXCLUDED.recruiter_id,
                scheduled_at = EXCLUDED.scheduled_at,
                candidate_last_name = EXCLUDED.candidate_last_name,
                candidate_first_name = EXCLUDED.candidate_first_name,
                candidate_email = EXCLUDED.candidate_email,
                position = EXCLUDED.position,
                interview_type = EXCLUDED.interview_type,
                location = EXCLUDED.location,
                status = 'pending',
                invitation_sent = FALSE,
                reminder_sent = FALSE,
                updated_at = NOW()
            WHERE interviews.status = 'cancelled'
            RETURNING interviews.*, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.candidate_id)
        .bind(draft.offer_id)
        .bind(draft.recruiter_id)
        .bind(draft.scheduled_at)
        .bind(&draft.candidate_last_name)
        .bind(&draft.candidate_first_name)
        .bind(&draft.candidate_email)
        .bind(&draft.position)
        .bind(draft.interview_type)
        .bind(&draft.location)
        .fetch_optional(&self.pool)
        .await?;

        match upserted {
            Some(row) if row.inserted => Ok(ScheduleOutcome::Created(row.interview)),
            Some(row) => Ok(ScheduleOutcome::Reused(row.interview)),
            None => {
                let existing = sqlx::query_as::<_, Interview>(
                    "SELECT * FROM interviews WHERE candidate_id = $1 AND offer_id = $2",
                )
                .bind(draft.candidate_id)
                .bind(draft.offer_id)
                .fetch_one(&self.pool)
                .await?;
                Ok(ScheduleOutcome::Conflict(existing))
            }
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<Interview>> {
        let interview = sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(interview)
    }

    async fn update_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<Interview>> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews SET status = $2, updated_at = NOW()
            WHERE id = $1 AND recruiter_id = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(interview)
    }

    async fn update_scheduled_at(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Option<Interview>> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET scheduled_at = $2, reminder_sent = FALSE, updated_at = NOW()
            WHERE id = $1 AND recruiter_id = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scheduled_at)
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(interview)
    }

    async fn mark_invitation_sent(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE interviews SET invitation_sent = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE recruiter_id = $1 ORDER BY scheduled_at ASC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn pending_for_recruiter_between(
        &self,
        recruiter_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, Interview>(
            r#"
            SELECT * FROM interviews
            WHERE recruiter_id = $1
              AND status = 'pending'
              AND scheduled_at >= $2
              AND scheduled_at < $3
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(recruiter_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn candidate_has_active(&self, candidate_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM interviews
                WHERE candidate_id = $1 AND status IN ('pending', 'completed')
            )
            "#,
        )
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn claim_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let rows = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET reminder_sent = TRUE, updated_at = NOW()
            WHERE reminder_sent = FALSE
              AND scheduled_at BETWEEN $1 AND $2
            RETURNING *
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
