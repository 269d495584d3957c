// src/spider.rs

use crate::{
    auth::Authenticator,
    config::{AppConfig, Selectors},
    credentials::{resolve_credentials, Prompter},
    discover::{ContentDiscoverer, ContentItem},
    download::{DownloadReport, Downloader},
    driver::PageDriver,
    error::SpiderResult,
    manifest,
};
use log::{error, info, warn};
use std::{fs, path::PathBuf};

/// What a run discovered and downloaded.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: Vec<ContentItem>,
    pub start_index: Option<usize>,
    pub report: Option<DownloadReport>,
}

/// Drives one browser session through login, discovery and downloads.
pub struct Spider<'a, D: PageDriver> {
    driver: &'a D,
    config: AppConfig,
    config_path: PathBuf,
    selectors: Selectors,
}

impl<'a, D: PageDriver> Spider<'a, D> {
    pub fn new(driver: &'a D, config: AppConfig, config_path: PathBuf) -> SpiderResult<Self> {
        let selectors = config.selectors()?;
        Ok(Self {
            driver,
            config,
            config_path,
            selectors,
        })
    }

    pub async fn run(&mut self, prompter: &mut dyn Prompter) -> SpiderResult<RunSummary> {
        let credentials = resolve_credentials(&mut self.config, &self.config_path, prompter)?;
        fs::create_dir_all(&self.config.download_path)?;

        info!("Accessing course page...");
        self.driver.goto(&self.config.course_url).await?;
        Authenticator::new(self.driver, &self.selectors, self.config.page_wait())
            .login(&credentials)
            .await?;

        info!("Loading course content...");
        let items = ContentDiscoverer::new(self.driver, &self.selectors, &self.config)
            .discover()
            .await?;

        let mut summary = RunSummary {
            discovered: items,
            ..RunSummary::default()
        };
        if summary.discovered.is_empty() {
            error!("No content found");
            return Ok(summary);
        }

        manifest::print_listing(&summary.discovered);
        if let Err(e) = manifest::write_manifest(&self.config.download_path, &summary.discovered) {
            warn!("Could not write content list: {e}");
        }

        let start_index = prompt_start_index(prompter, summary.discovered.len())?;
        summary.start_index = Some(start_index);

        let report = Downloader::new(self.driver, &self.selectors, &self.config)
            .download_all(&summary.discovered[start_index..])
            .await;
        summary.report = Some(report);
        Ok(summary)
    }
}

/// Ask for an index into a list of `count` items until a valid one is given.
pub fn prompt_start_index(prompter: &mut dyn Prompter, count: usize) -> SpiderResult<usize> {
    let last = count.saturating_sub(1);
    loop {
        let answer = prompter.line(&format!("\nEnter the starting index (0-{last}): "))?;
        match answer.trim().parse::<usize>() {
            Ok(index) if index < count => return Ok(index),
            _ => println!("Please enter a number between 0 and {last}"),
        }
    }
}

/// Run the whole workflow on `driver`, then close the session whatever the
/// outcome.
pub async fn run_session<D: PageDriver>(
    driver: D,
    config: AppConfig,
    config_path: PathBuf,
    prompter: &mut dyn Prompter,
) -> SpiderResult<RunSummary> {
    let result = match Spider::new(&driver, config, config_path) {
        Ok(mut spider) => spider.run(prompter).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        error!("Error occurred: {e}");
    }

    match driver.quit().await {
        Ok(()) => info!("Browser session closed"),
        Err(e) => warn!("Failed to close the browser session: {e}"),
    }
    result
}
