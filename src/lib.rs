pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::interview_store::{InterviewStore, PgInterviewStore};
use crate::services::{
    directory_service::{Directory, PgDirectory},
    interview_service::InterviewService,
    notification_service::{Notifier, OutboxNotifier},
};
use crate::utils::time::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub interview_service: InterviewService,
    pub directory: Arc<dyn Directory>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        Self::from_parts(
            Arc::new(PgInterviewStore::new(pool.clone())),
            Arc::new(PgDirectory::new(pool.clone())),
            Arc::new(OutboxNotifier::new(pool, config.outbox_max_attempts)),
            Arc::new(SystemClock),
        )
    }

    pub fn from_parts(
        store: Arc<dyn InterviewStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let interview_service = InterviewService::new(store, directory.clone(), notifier, clock);
        Self {
            interview_service,
            directory,
        }
    }
}
