use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::interview_store::InterviewStore;
use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewDraft, InterviewStatus, ScheduleOutcome};
use crate::utils::time::{Clock, SystemClock};

/// In-process store; every operation runs under a single lock, which makes
/// the pair lookup and the create-or-revive in `schedule` one critical section.
pub struct MemoryInterviewStore {
    rows: Mutex<HashMap<Uuid, Interview>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryInterviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInterviewStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn rows(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Interview>>> {
        self.rows
            .lock()
            .map_err(|_| Error::Internal("interview store lock poisoned".to_string()))
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<Interview>
    where
        F: FnOnce(&mut Interview),
    {
        let now = self.clock.now();
        let mut rows = self.rows()?;
        let interview = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;
        apply(interview);
        interview.updated_at = now;
        Ok(interview.clone())
    }

    fn update_owned<F>(&self, id: Uuid, recruiter_id: Uuid, apply: F) -> Result<Option<Interview>>
    where
        F: FnOnce(&mut Interview),
    {
        let now = self.clock.now();
        let mut rows = self.rows()?;
        let Some(interview) = rows.get_mut(&id).filter(|i| i.recruiter_id == recruiter_id) else {
            return Ok(None);
        };
        apply(interview);
        interview.updated_at = now;
        Ok(Some(interview.clone()))
    }

    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InterviewStore for MemoryInterviewStore {
    async fn schedule(&self, draft: InterviewDraft) -> Result<ScheduleOutcome> {
        let now = self.clock.now();
        let mut rows = self.rows()?;

        let existing = rows
            .values_mut()
            .find(|i| i.candidate_id == draft.candidate_id && i.offer_id == draft.offer_id);

        match existing {
            Some(interview) if interview.status.is_active() => {
                Ok(ScheduleOutcome::Conflict(interview.clone()))
            }
            Some(interview) => {
                interview.recruiter_id = draft.recruiter_id;
                interview.scheduled_at = draft.scheduled_at;
                interview.candidate_last_name = draft.candidate_last_name;
                interview.candidate_first_name = draft.candidate_first_name;
                interview.candidate_email = draft.candidate_email;
                interview.position = draft.position;
                interview.interview_type = draft.interview_type;
                interview.location = draft.location;
                interview.status = InterviewStatus::Pending;
                interview.invitation_sent = false;
                interview.reminder_sent = false;
                interview.updated_at = now;
                Ok(ScheduleOutcome::Reused(interview.clone()))
            }
            None => {
                let interview = Interview {
                    id: Uuid::new_v4(),
                    candidate_id: draft.candidate_id,
                    offer_id: draft.offer_id,
                    recruiter_id: draft.recruiter_id,
                    scheduled_at: draft.scheduled_at,
                    candidate_last_name: draft.candidate_last_name,
                    candidate_first_name: draft.candidate_first_name,
                    candidate_email: draft.candidate_email,
                    position: draft.position,
                    interview_type: draft.interview_type,
                    location: draft.location,
                    status: InterviewStatus::Pending,
                    invitation_sent: false,
                    reminder_sent: false,
                    created_at: now,
                    updated_at: now,
                };
                rows.insert(interview.id, interview.clone());
                Ok(ScheduleOutcome::Created(interview))
            }
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<Interview>> {
        Ok(self.rows()?.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<Interview>> {
        self.update_owned(id, recruiter_id, |i| i.status = status)
    }

    async fn update_scheduled_at(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Option<Interview>> {
        self.update_owned(id, recruiter_id, |i| {
            i.scheduled_at = scheduled_at;
            i.reminder_sent = false;
        })
    }

    async fn mark_invitation_sent(&self, id: Uuid) -> Result<()> {
        self.update(id, |i| i.invitation_sent = true).map(|_| ())
    }

    async fn list_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Interview>> {
        let mut found: Vec<Interview> = self
            .rows()?
            .values()
            .filter(|i| i.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.scheduled_at);
        Ok(found)
    }

    async fn pending_for_recruiter_between(
        &self,
        recruiter_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let mut found: Vec<Interview> = self
            .rows()?
            .values()
            .filter(|i| {
                i.recruiter_id == recruiter_id
                    && i.status == InterviewStatus::Pending
                    && i.scheduled_at >= from
                    && i.scheduled_at < to
            })
            .cloned()
            .collect();
        found.sort_by_key(|i| i.scheduled_at);
        Ok(found)
    }

    async fn candidate_has_active(&self, candidate_id: Uuid) -> Result<bool> {
        Ok(self
            .rows()?
            .values()
            .any(|i| i.candidate_id == candidate_id && i.status.is_active()))
    }

    async fn claim_reminders(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let now = self.clock.now();
        let mut rows = self.rows()?;
        let mut claimed = Vec::new();
        for interview in rows.values_mut() {
            if !interview.reminder_sent
                && interview.scheduled_at >= from
                && interview.scheduled_at <= to
            {
                interview.reminder_sent = true;
                interview.updated_at = now;
                claimed.push(interview.clone());
            }
        }
        claimed.sort_by_key(|i| i.scheduled_at);
        Ok(claimed)
    }
}
