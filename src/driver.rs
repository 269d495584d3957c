// src/driver.rs

//! The page-driver capability consumed by the workflow.
//!
//! Every stage is generic over [`PageDriver`], so the same code runs against a
//! live browser session ([`crate::browser::BrowserDriver`]) or an in-memory
//! page model in tests.

use crate::{error::SpiderResult, locator::Locator};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// An element handle returned by [`PageDriver::find_all`].
#[async_trait]
pub trait PageElement: Send + Sync {
    async fn text(&self) -> SpiderResult<String>;

    async fn attr(&self, name: &str) -> SpiderResult<Option<String>>;

    async fn click(&self) -> SpiderResult<()>;

    /// Click an element whose activation starts a browser download. Only the
    /// click itself is checked, never the transfer.
    async fn click_to_download(&self) -> SpiderResult<()>;

    async fn send_keys(&self, text: &str) -> SpiderResult<()>;
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: PageElement;

    async fn goto(&self, url: &str) -> SpiderResult<()>;

    /// All elements currently matching `locator`, in document order.
    async fn find_all(&self, locator: &Locator) -> SpiderResult<Vec<Self::Element>>;

    /// Run a script and return its scalar result.
    async fn execute(&self, script: &str) -> SpiderResult<Value>;

    /// Direct subsequent browser downloads into `dir`.
    async fn set_download_dir(&self, _dir: &Path) -> SpiderResult<()> {
        Ok(())
    }

    /// End the browser session.
    async fn quit(&self) -> SpiderResult<()>;
}
