use std::{sync::Arc, time::Duration};

use modbot::{
    bot::{gateway::SerenityPlatform, start::start_bot, Bot, ExitCode},
    config::{Config, RuntimeConfig},
    error::AppError,
    startup,
};

/// Pause before exiting after a crash so a supervisor restart does not hammer the gateway.
const CRASH_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env();

    // Invalid settings are fatal and must not trigger a restart loop.
    let runtime = match RuntimeConfig::load(&config.config_path) {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(
                "Failed to load config from {}: {}",
                config.config_path.display(),
                e
            );
            std::process::exit(ExitCode::Quit.code());
        }
    };

    let code = match run(&config, runtime).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Bot crashed: {:?}", e);
            tokio::time::sleep(CRASH_DELAY).await;
            ExitCode::Crash
        }
    };

    std::process::exit(code.code());
}

async fn run(config: &Config, runtime: RuntimeConfig) -> Result<ExitCode, AppError> {
    let db = startup::connect_to_database(config).await?;

    let platform = Arc::new(SerenityPlatform::new());
    let bot = Bot::new(runtime, db, platform.clone())?;

    start_bot(bot.clone(), platform).await?;

    if let Err(e) = bot.config().await.persist_if_dirty() {
        tracing::error!("Failed to save config on exit: {}", e);
    }

    let code = bot.exit_code();
    match code {
        ExitCode::Quit => tracing::info!("Shutting down"),
        ExitCode::Restart => tracing::info!("Restarting on request"),
        ExitCode::Crash => tracing::warn!("Client stopped unexpectedly, requesting a restart"),
    }

    Ok(code)
}
