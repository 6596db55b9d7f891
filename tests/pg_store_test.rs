mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use recruitment_scheduler::database::interview_store::{InterviewStore, PgInterviewStore};
use recruitment_scheduler::database::pool::{create_pool, run_migrations};
use recruitment_scheduler::models::interview::{
    InterviewDraft, InterviewStatus, InterviewType, ScheduleOutcome,
};

fn draft(candidate_id: Uuid, offer_id: Uuid, recruiter_id: Uuid) -> InterviewDraft {
    InterviewDraft {
        candidate_id,
        offer_id,
        recruiter_id,
        scheduled_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        candidate_last_name: "Dupont".into(),
        candidate_first_name: "Jean".into(),
        candidate_email: "jean.dupont@example.com".into(),
        position: "Web Developer".into(),
        interview_type: InterviewType::Online,
        location: Some("https://meet.example.com/xyz".into()),
    }
}

#[tokio::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn concurrent_schedules_against_postgres_leave_one_pending_row() {
    common::init_test_config();
    let pool = create_pool().await.expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let (recruiter, candidate, offer) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, 'recruiter')")
        .bind(recruiter)
        .bind(format!("rec_{}@example.com", recruiter))
        .execute(&pool)
        .await
        .expect("seed user");
    sqlx::query(
        "INSERT INTO candidates (id, last_name, first_name, email) VALUES ($1, 'Dupont', 'Jean', 'jean.dupont@example.com')",
    )
    .bind(candidate)
    .execute(&pool)
    .await
    .expect("seed candidate");
    sqlx::query("INSERT INTO offers (id, title, recruiter_id) VALUES ($1, 'Web Developer', $2)")
        .bind(offer)
        .bind(recruiter)
        .execute(&pool)
        .await
        .expect("seed offer");

    let store = Arc::new(PgInterviewStore::new(pool.clone()));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.schedule(draft(candidate, offer, recruiter)).await })
        })
        .collect();

    let mut created = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap().expect("schedule") {
            ScheduleOutcome::Created(i) => created.push(i),
            ScheduleOutcome::Conflict(_) => conflicts += 1,
            ScheduleOutcome::Reused(_) => panic!("nothing was cancelled"),
        }
    }
    assert_eq!(created.len(), 1);
    assert_eq!(conflicts, 7);

    let first = created.remove(0);
    store
        .update_status(first.id, recruiter, InterviewStatus::Cancelled)
        .await
        .expect("cancel")
        .expect("owner may cancel");
    let stranger = store
        .update_status(first.id, Uuid::new_v4(), InterviewStatus::Completed)
        .await
        .expect("scoped update");
    assert!(stranger.is_none());
    match store.schedule(draft(candidate, offer, recruiter)).await.expect("revive") {
        ScheduleOutcome::Reused(revived) => {
            assert_eq!(revived.id, first.id);
            assert_eq!(revived.status, InterviewStatus::Pending);
        }
        other => panic!("expected the cancelled row to be reused, got {:?}", other),
    }

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM interviews WHERE candidate_id = $1 AND offer_id = $2")
            .bind(candidate)
            .bind(offer)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}
