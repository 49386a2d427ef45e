//! Questboard - Main entry point.

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questboard_engine::api::{shell, ConsoleInput, StdinAbilityChooser};
use questboard_engine::infrastructure::{
    clock::{SystemClock, SystemRandom},
    dnd5e_api::Dnd5eApiClient,
    settings::AppConfig,
    storage::FileStorageProvider,
};
use questboard_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Logs go to stderr so they never interleave with rendered views.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questboard_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        storage = %config.storage_path.display(),
        api_url = %config.api_url,
        "Starting Questboard"
    );

    let storage = Arc::new(FileStorageProvider::open(config.storage_path.clone()));
    let reference = Arc::new(Dnd5eApiClient::new(&config.api_url, config.http_timeout));
    let input = Arc::new(ConsoleInput::stdin());
    let chooser = Arc::new(StdinAbilityChooser::new(input.clone()));

    let app = Arc::new(App::new(
        &config,
        storage,
        reference,
        chooser,
        Arc::new(SystemClock),
        Arc::new(SystemRandom),
    ));

    shell::run(app, input).await?;
    tracing::info!("Questboard stopped");
    Ok(())
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = Path::new(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(path) {
                eprintln!("Ignoring {}: {}", filename, e);
            }
        }
    }
}
