// src/download.rs

use crate::{
    config::{AppConfig, Selectors},
    discover::ContentItem,
    driver::{PageDriver, PageElement},
    error::SpiderResult,
    wait::{wait_and_act, wait_for_element, Action},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::{fmt, fs, path::PathBuf};
use tokio::time::sleep;

pub const PROGRESS_MESSAGE: &str = "Download progress";

/// Progress bar over `len` downloads, drawn on stderr when it is a terminal.
pub fn download_progress(len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template("{prefix} {wide_bar} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let progress = ProgressBar::new(len as u64).with_style(style);
    progress.set_prefix(PROGRESS_MESSAGE);
    progress.set_message(PROGRESS_MESSAGE);
    progress
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Menu,
    None,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Direct => "direct",
            Strategy::Menu => "menu",
            Strategy::None => "none",
        })
    }
}

/// Outcome of one item. Success means the download click went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadAttempt {
    pub success: bool,
    pub strategy: Strategy,
}

impl DownloadAttempt {
    fn succeeded(strategy: Strategy) -> Self {
        Self {
            success: true,
            strategy,
        }
    }

    fn failed(strategy: Strategy) -> Self {
        Self {
            success: false,
            strategy,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub direct: usize,
    pub menu: usize,
    pub failed: Vec<ContentItem>,
}

impl DownloadReport {
    pub fn record(&mut self, item: &ContentItem, attempt: DownloadAttempt) {
        match (attempt.success, attempt.strategy) {
            (true, Strategy::Direct) => self.direct += 1,
            (true, Strategy::Menu) => self.menu += 1,
            _ => self.failed.push(item.clone()),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.direct + self.menu
    }
}

/// Opens each content page and triggers its download.
pub struct Downloader<'a, D: PageDriver> {
    driver: &'a D,
    selectors: &'a Selectors,
    config: &'a AppConfig,
}

impl<'a, D: PageDriver> Downloader<'a, D> {
    pub fn new(driver: &'a D, selectors: &'a Selectors, config: &'a AppConfig) -> Self {
        Self {
            driver,
            selectors,
            config,
        }
    }

    /// Download every item in order. A failed item never stops the loop.
    pub async fn download_all(&self, items: &[ContentItem]) -> DownloadReport {
        let mut report = DownloadReport::default();
        let progress = download_progress(items.len());
        for item in items {
            progress.set_message(format!("[{}] {}", item.week_label, item.title));
            let attempt = self.download(item).await;
            report.record(item, attempt);
            progress.inc(1);
        }
        progress.finish_with_message(PROGRESS_MESSAGE);

        info!(
            "Downloads finished: {} succeeded ({} direct, {} menu), {} failed",
            report.succeeded(),
            report.direct,
            report.menu,
            report.failed.len()
        );
        for item in &report.failed {
            warn!("Not downloaded: [{}] {} ({})", item.week_label, item.title, item.url);
        }
        report
    }

    pub async fn download(&self, item: &ContentItem) -> DownloadAttempt {
        let attempt = match self.try_download(item).await {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!("Download failed {}: {e}", item.title);
                DownloadAttempt::failed(Strategy::None)
            }
        };

        if attempt.success {
            info!("Successfully downloaded ({}): {}", attempt.strategy, item.title);
        } else {
            warn!("Failed to download ({}): {}", attempt.strategy, item.title);
        }

        // Let the browser start the transfer before the next navigation.
        sleep(self.config.delays.post_download_delay()).await;
        attempt
    }

    async fn try_download(&self, item: &ContentItem) -> SpiderResult<DownloadAttempt> {
        self.prepare_week_folder(item).await;
        self.driver.goto(&item.url).await?;

        if let Err(e) =
            wait_for_element(self.driver, &self.selectors.page_ready, self.config.page_wait()).await
        {
            warn!("Page load timeout for {}: {e}", item.title);
            return Ok(DownloadAttempt::failed(Strategy::None));
        }

        // Direct strategy: a single visible download button.
        let control_wait = self.config.control_wait();
        match wait_for_element(self.driver, &self.selectors.download_button, control_wait).await {
            Ok(direct_button) => {
                // The menu is not tried once a direct button exists.
                return Ok(match direct_button.click_to_download().await {
                    Ok(()) => DownloadAttempt::succeeded(Strategy::Direct),
                    Err(e) => {
                        warn!("Direct download click failed for {}: {e}", item.title);
                        DownloadAttempt::failed(Strategy::Direct)
                    }
                });
            }
            Err(e) => debug!("No direct download button: {e}"),
        }

        // Menu strategy: open "more options", then pick "Download original file".
        let more_options =
            match wait_for_element(self.driver, &self.selectors.download_options, control_wait).await {
                Ok(element) => element,
                Err(e) => {
                    debug!("More options control not found: {e}");
                    return Ok(DownloadAttempt::failed(Strategy::None));
                }
            };
        if let Err(e) = more_options.click().await {
            warn!("Could not open the download menu for {}: {e}", item.title);
            return Ok(DownloadAttempt::failed(Strategy::Menu));
        }
        // The menu renders after a short animation.
        sleep(self.config.delays.menu_delay()).await;

        match wait_and_act(
            self.driver,
            &self.selectors.original_file,
            Action::ClickToDownload,
            control_wait,
        )
        .await
        {
            Ok(()) => Ok(DownloadAttempt::succeeded(Strategy::Menu)),
            Err(e) => {
                warn!("Download original file option not found: {e}");
                Ok(DownloadAttempt::failed(Strategy::Menu))
            }
        }
    }

    /// Create `<download_path>/Week_<n>` and point browser downloads at it.
    async fn prepare_week_folder(&self, item: &ContentItem) {
        let folder = self.week_folder(item);
        if let Err(e) = fs::create_dir_all(&folder) {
            warn!("Could not create {}: {e}", folder.display());
            return;
        }
        let folder = std::path::absolute(&folder).unwrap_or(folder);
        if let Err(e) = self.driver.set_download_dir(&folder).await {
            warn!("Could not direct downloads to {}: {e}", folder.display());
        }
    }

    pub fn week_folder(&self, item: &ContentItem) -> PathBuf {
        self.config
            .download_path
            .join(format!("Week_{}", item.week_number()))
    }
}
