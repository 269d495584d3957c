// src/browser.rs

use crate::{
    driver::{PageDriver, PageElement},
    error::SpiderResult,
    locator::{Locator, LocatorKind},
};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{json, Value};
use std::path::Path;
use thirtyfour::{extensions::cdp::ChromeDevTools, prelude::*, By, ChromiumLikeCapabilities};

/// A live Chromium session driven over WebDriver.
pub struct BrowserDriver {
    pub driver: WebDriver,
}

impl BrowserDriver {
    /// Start a new session against the WebDriver server at `server_url`.
    pub async fn launch(server_url: &str, headless: bool) -> SpiderResult<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            info!("Running in headless mode");
            caps.set_headless()?;
        } else {
            info!("Running in normal (visible) mode. Set HEADLESS=true to run headless.");
        }

        let driver = WebDriver::new(server_url, caps).await?;
        Ok(Self { driver })
    }
}

fn by(locator: &Locator) -> By {
    match locator.kind() {
        LocatorKind::Css => By::Css(locator.body()),
        LocatorKind::XPath => By::XPath(locator.body()),
    }
}

#[async_trait]
impl PageDriver for BrowserDriver {
    type Element = BrowserElement;

    async fn goto(&self, url: &str) -> SpiderResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> SpiderResult<Vec<BrowserElement>> {
        let elements = self.driver.find_all(by(locator)).await?;
        Ok(elements.into_iter().map(BrowserElement).collect())
    }

    async fn execute(&self, script: &str) -> SpiderResult<Value> {
        let ret = self.driver.execute(script, Vec::new()).await?;
        Ok(ret.json().clone())
    }

    async fn set_download_dir(&self, dir: &Path) -> SpiderResult<()> {
        let dev_tools = ChromeDevTools::new(self.driver.handle.clone());
        dev_tools
            .execute_cdp_with_params(
                "Browser.setDownloadBehavior",
                json!({
                    "behavior": "allow",
                    "downloadPath": dir.to_string_lossy(),
                }),
            )
            .await?;
        debug!("Browser downloads now go to {}", dir.display());
        Ok(())
    }

    async fn quit(&self) -> SpiderResult<()> {
        self.driver.clone().quit().await?;
        Ok(())
    }
}

pub struct BrowserElement(pub WebElement);

#[async_trait]
impl PageElement for BrowserElement {
    async fn text(&self) -> SpiderResult<String> {
        Ok(self.0.text().await?)
    }

    async fn attr(&self, name: &str) -> SpiderResult<Option<String>> {
        Ok(self.0.attr(name).await?)
    }

    async fn click(&self) -> SpiderResult<()> {
        self.0.scroll_into_view().await?;
        self.0.click().await?;
        Ok(())
    }

    async fn click_to_download(&self) -> SpiderResult<()> {
        // The browser's download policy takes it from here.
        self.click().await
    }

    async fn send_keys(&self, text: &str) -> SpiderResult<()> {
        self.0.clear().await?;
        self.0.send_keys(text).await?;
        Ok(())
    }
}
