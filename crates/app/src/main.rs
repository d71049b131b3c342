use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use store::retention::{Clock, SystemClock, sweep_due};

mod liveness;
mod settings;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kopilka={level},telegram_bot={level},store={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let store = store::Store::new(db);

    // Retention sweeper: unconditional 24h timer from boot. The first tick
    // fires immediately, so a restart on the 5th still sweeps.
    {
        let store = store.clone();
        tasks.spawn(async move {
            let clock = SystemClock;
            let mut timer = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                timer.tick().await;
                let today = clock.today();
                if !sweep_due(today) {
                    continue;
                }
                let report = store.sweep_previous_month(today).await;
                tracing::info!(
                    pattern = %report.pattern,
                    deleted = report.deleted(),
                    "retention sweep finished"
                );
            }
        });
    }

    if let Some(telegram) = settings.telegram {
        let store = store.clone();
        tasks.spawn(async move {
            tracing::info!("Found telegram settings...");
            match telegram_bot::Bot::builder()
                .token(&telegram.token)
                .allowed_ids(telegram.allowed_ids.unwrap_or_default())
                .store(store)
                .build()
            {
                Ok(bot) => bot.run().await,
                Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
            }
        });
    }

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind liveness listener: {err}");
                    return;
                }
            };
            if let Err(err) = liveness::serve(listener).await {
                tracing::error!("liveness server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
