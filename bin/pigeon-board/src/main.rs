//! # Pigeon-Board Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod settings;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use pn_api::configure_routes;
use pn_api::handlers::AppState;
use pn_api::middleware::{cors_policy, security_headers, standard_middleware};
use pn_api::realtime::BroadcastCounterFeed;
use tokio::sync::broadcast::error::RecvError;

use crate::settings::Settings;

// Feature-gated imports
#[cfg(feature = "db-sqlite")]
use pn_db_sqlite::SqlitePostRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("pigeon-board needs a storage backend; enable the `db-sqlite` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env().context("invalid PIGEON_* settings")?;

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqlitePostRepo::with_max_connections(&settings.database_url, settings.max_connections)
        .await
        .with_context(|| format!("failed to open {}", settings.database_url))?;

    // 2. Counter feed, with a debug tap so updates are visible in the log
    let feed = BroadcastCounterFeed::default();
    let mut updates = feed.subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(counters) => log::debug!(
                    "post {} now +{} -{} !{}",
                    counters.post_id,
                    counters.upvotes,
                    counters.downvotes,
                    counters.reports
                ),
                Err(RecvError::Lagged(skipped)) => log::debug!("counter tap skipped {skipped} updates"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 3. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        feed: Box::new(feed),
    });

    log::info!("Pigeon-Board starting on http://{}", settings.bind_addr);

    let cors_max_age = settings.cors_max_age;
    HttpServer::new(move || {
        App::new()
            .wrap(cors_policy(cors_max_age))
            .wrap(security_headers())
            .wrap(standard_middleware())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&settings.bind_addr)
    .with_context(|| format!("cannot bind {}", settings.bind_addr))?
    .run()
    .await?;

    Ok(())
}
