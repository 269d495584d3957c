// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use lecture_spider::{
    browser::BrowserDriver,
    config::{AppConfig, CONFIG_FILE},
    credentials::StdinPrompter,
    logging,
    spider::run_session,
};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Log into the course portal, list the lecture content of every week and
/// download it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file holding credentials, paths and selectors.
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// WebDriver server (chromedriver) to start the browser session on.
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    webdriver: String,

    #[arg(long, env = "HEADLESS")]
    headless: bool,

    /// Course outline page, overriding `course_url` from the config.
    #[arg(long)]
    course_url: Option<String>,

    #[arg(long, default_value = logging::LOG_FILE)]
    log_file: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::init(&cli.log_file, level).context("Could not set up logging")?;

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Could not read {}", cli.config.display()))?;
    if let Some(url) = cli.course_url {
        config.course_url = url;
    }
    config
        .selectors()
        .context("Selectors in the configuration are not valid")?;

    let driver = BrowserDriver::launch(&cli.webdriver, cli.headless)
        .await
        .with_context(|| format!("Could not start a browser session on {}", cli.webdriver))?;

    // Errors are logged by the session; the run itself always ends normally.
    if let Ok(summary) = run_session(driver, config, cli.config, &mut StdinPrompter).await {
        if let Some(report) = summary.report {
            info!(
                "Done: {} of {} items downloaded",
                report.succeeded(),
                report.succeeded() + report.failed.len()
            );
        }
    }

    Ok(())
}
