use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classbook::config::Config;
use classbook::{db, seed, session, web};

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("classbook={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::parse();
    init_tracing(&config.log_level);

    let conn = db::open_db(&config.workspace)?;
    if config.seed_demo {
        seed::seed_demo(&conn)?;
        tracing::info!("demo data seeded into {}", config.workspace.display());
    }

    let state = web::AppState {
        db: Arc::new(Mutex::new(conn)),
        key: session::signing_key(&config.secret_key),
        report_font: Arc::new(config.report_font.clone()),
    };
    let app = web::router(state);

    let address = format!("0.0.0.0:{}", config.port);
    tracing::info!("classbook listening on {}", address);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
