// src/discover.rs

use crate::{
    config::{AppConfig, Selectors},
    driver::{PageDriver, PageElement},
    error::SpiderResult,
    wait::{retry_with_backoff, wait_for_element},
};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;

pub const HEIGHT_SCRIPT: &str = "return document.documentElement.scrollHeight";
pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.documentElement.scrollHeight);";

/// One downloadable resource found in a week folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub url: String,
    pub title: String,
    pub week_label: String,
}

impl ContentItem {
    pub fn week_number(&self) -> String {
        week_number(&self.week_label)
    }
}

/// Digits of the label up to its first `-`, so "Week 3 - 12/02" gives "3".
/// A label without digits gives an empty string.
pub fn week_number(label: &str) -> String {
    label
        .split('-')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

fn is_collapsed(expanded: Option<&str>) -> bool {
    expanded == Some("false")
}

/// Expands the course outline and collects the content links of every week.
pub struct ContentDiscoverer<'a, D: PageDriver> {
    driver: &'a D,
    selectors: &'a Selectors,
    config: &'a AppConfig,
}

impl<'a, D: PageDriver> ContentDiscoverer<'a, D> {
    pub fn new(driver: &'a D, selectors: &'a Selectors, config: &'a AppConfig) -> Self {
        Self {
            driver,
            selectors,
            config,
        }
    }

    /// Items in folder order, then document order inside each folder.
    pub async fn discover(&self) -> SpiderResult<Vec<ContentItem>> {
        self.expand_lectures().await?;

        let week_buttons = self.driver.find_all(&self.selectors.week_buttons).await?;
        info!("Found {} week folders", week_buttons.len());

        let mut all_content = Vec::new();
        for (index, week_button) in week_buttons.iter().enumerate() {
            match self.week_content(week_button).await {
                Ok(content) => all_content.extend(content),
                Err(e) => error!("Failed to get content of week folder {}: {e}", index + 1),
            }
            // Lazily rendered folders only appear near the viewport.
            if let Err(e) = self.scroll_to_bottom().await {
                warn!("Scrolling after week folder {} failed: {e}", index + 1);
            }
        }

        info!("Found {} content items", all_content.len());
        Ok(all_content)
    }

    async fn expand_lectures(&self) -> SpiderResult<()> {
        info!("Waiting for the Lectures folder...");
        let page_wait = self.config.page_wait();
        let located = retry_with_backoff(self.config.retry_policy(), "Locating Lectures folder", || {
            wait_for_element(self.driver, &self.selectors.lectures_button, page_wait)
        })
        .await;

        // The folder id changes between courses; fall back to its visible text.
        let lectures_button = match (located, &self.selectors.lectures_button_fallback) {
            (Ok(button), _) => button,
            (Err(e), Some(fallback)) => {
                warn!("Lectures folder not found by id ({e}), trying '{fallback}'");
                wait_for_element(self.driver, fallback, self.config.control_wait()).await?
            }
            (Err(e), None) => return Err(e),
        };

        let expanded = lectures_button.attr("aria-expanded").await?;
        if is_collapsed(expanded.as_deref()) {
            info!("Expanding Lectures folder");
            lectures_button.click().await?;
            sleep(self.config.delays.expand_delay()).await;
            self.scroll_to_bottom().await?;
        } else {
            debug!("Lectures folder already expanded");
        }
        Ok(())
    }

    async fn week_content(&self, week_button: &D::Element) -> SpiderResult<Vec<ContentItem>> {
        let week_label = week_button.text().await?.trim().to_string();
        info!("Processing {week_label}");

        let content_id = match week_button.attr("aria-controls").await? {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                warn!("{week_label} has no content panel, skipping");
                return Ok(Vec::new());
            }
        };
        debug!("Content ID: {content_id}");

        // Children are only in the DOM once the folder is open.
        let expanded = week_button.attr("aria-expanded").await?;
        if is_collapsed(expanded.as_deref()) {
            week_button.click().await?;
            sleep(self.config.delays.expand_delay()).await;
        }

        let links_locator = self.selectors.content_links.render(&content_id)?;
        let links = self.driver.find_all(&links_locator).await?;

        let mut items = Vec::new();
        for link in &links {
            let Some(href) = link.attr("href").await? else {
                continue;
            };
            let title = link.text().await?.trim().to_string();
            if title.is_empty() || !href.contains(&self.config.link_pattern) {
                debug!("Skipping link {href:?}");
                continue;
            }
            info!("Link found - href: {href}, text: {title}");
            items.push(ContentItem {
                url: href,
                title,
                week_label: week_label.clone(),
            });
        }

        if items.is_empty() {
            warn!("No valid links found in {week_label}");
        } else {
            info!("Found {} valid links in {week_label}", items.len());
        }
        Ok(items)
    }

    async fn scroll_to_bottom(&self) -> SpiderResult<()> {
        scroll_to_bottom(
            self.driver,
            self.config.delays.scroll_delay(),
            self.config.delays.max_scroll_rounds,
        )
        .await
    }
}

/// Scroll until the document height stops growing, so lazily rendered
/// content is in the DOM.
pub async fn scroll_to_bottom<D: PageDriver>(
    driver: &D,
    delay: Duration,
    max_rounds: u32,
) -> SpiderResult<()> {
    let mut last_height = driver.execute(HEIGHT_SCRIPT).await?;
    for _ in 0..max_rounds {
        driver.execute(SCROLL_SCRIPT).await?;
        sleep(delay).await;
        let new_height = driver.execute(HEIGHT_SCRIPT).await?;
        if new_height == last_height {
            return Ok(());
        }
        last_height = new_height;
    }
    debug!("Page height still changing after {max_rounds} scrolls");
    Ok(())
}
