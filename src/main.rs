#![cfg(not(tarpaulin_include))]

use worklog::{app, config::Config};

/// Main entry point for the work log web application
///
/// Reads configuration from the environment, connects to the spreadsheet
/// and serves until the process is stopped. Logging goes through
/// `env_logger`; set `RUST_LOG` to change the default `info` level.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!(
        "starting work log server (spreadsheet: {})",
        config
            .spreadsheet_id
            .as_deref()
            .unwrap_or(&config.spreadsheet_name)
    );

    app::run(config).await?;
    Ok(())
}
