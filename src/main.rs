use recruitment_scheduler::services::{
    notification_service::{EmailOutboxWorker, MailRelay},
    reminder_service::start_reminder_job,
};
use recruitment_scheduler::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    middleware::cors::cors_layer,
    routes, telemetry, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    telemetry::init(config.log_format)?;

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool.clone());

    {
        let worker = EmailOutboxWorker::new(
            pool.clone(),
            MailRelay {
                url: config.mail_relay_url.clone(),
                token: config.mail_relay_token.clone(),
                from_address: config.mail_from_address.clone(),
                from_name: config.mail_from_name.clone(),
            },
        )?;
        tokio::spawn(async move {
            match worker.requeue_stalled().await {
                Ok(0) => {}
                Ok(n) => info!(count = n, "Requeued stalled outbox emails"),
                Err(e) => tracing::error!(error = ?e, "Failed to requeue stalled outbox emails"),
            }
            loop {
                match worker.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Email outbox worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let _reminders =
        start_reminder_job(app_state.interview_service.clone(), &config.reminder_cron).await?;

    let app = routes::router(app_state, config.api_rps)
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
