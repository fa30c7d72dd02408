use blescan::{
    application::{self, Output},
    bluez::BluezBackend,
    config::ScreenConfig,
    error::BlescanResult,
    logger::{init_logger, LoggerType},
    opts::{Action, Opts},
    screen::Screen,
};

use std::time::Duration;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> BlescanResult<()> {
    let opts = Opts::from_env();
    run(&opts).await?;

    Ok(())
}

async fn run(opts: &Opts) -> BlescanResult<()> {
    let config = ScreenConfig::from(opts);
    let action = opts.action();

    match &action {
        Action::Screen => init_logger(LoggerType::Interactive, config.log_level, &config.log_file)?,
        Action::Scan { .. } | Action::Connect { .. } => {
            init_logger(LoggerType::Command, config.log_level, &config.log_file)?
        }
    };

    let backend = BluezBackend::open(config.adapter.as_deref()).await?;
    let permissions = backend.permissions();
    let screen = Screen::mount(backend, &permissions, &config).await;
    let output = Output::new(config.json);

    match action {
        Action::Screen => {
            let stdin = BufReader::new(tokio::io::stdin());
            application::run_interactive(screen, stdin, &output).await
        }
        Action::Scan { duration } => {
            application::run_scan(screen, Duration::from_secs(duration), &output).await
        }
        Action::Connect { id } => application::run_connect(screen, &id, &output).await,
    }
}
