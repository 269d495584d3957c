// src/config.rs

use crate::{
    error::{SpiderError, SpiderResult},
    locator::Locator,
    wait::{RetryPolicy, WaitPolicy},
};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CONFIG_FILE: &str = "config.json";

static DEFAULT_COURSE_URL: &str = "https://abdn.blackboard.com/ultra/courses/_66721_1/outline";

/// Built-in selectors, keyed by logical name. Entries in `config.json`
/// override these one by one.
static DEFAULT_SELECTORS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("username", "#user_id"),
        ("password", "#password"),
        ("login_button", "#entry-login"),
        ("lectures_button", "#folder-title-_4389218_1"),
        (
            "lectures_button_fallback",
            "xpath://button[contains(text(), 'Lectures & Practical Sessions')]",
        ),
        (
            "week_buttons",
            "button[id^='folder-title-'][aria-controls^='folder-contents-']",
        ),
        (
            "content_links",
            "xpath://div[@id='{content_id}']//a[contains(@class, 'MuiTypography')]",
        ),
        (
            "page_ready",
            "xpath://*[local-name()='svg' and contains(@class, 'MuiSvgIcon') and contains(@class, 'ms-Button-icon')]",
        ),
        (
            "download_button",
            "button[aria-label='Download'], button[title='Download']",
        ),
        ("download_options", "css=div.ms-Button-flexContainer svg.MuiSvgIcon"),
        ("original_file", "xpath://span[text()='Download original file']"),
    ])
});

const REQUIRED_SELECTORS: [&str; 10] = [
    "username",
    "password",
    "login_button",
    "lectures_button",
    "week_buttons",
    "content_links",
    "page_ready",
    "download_button",
    "download_options",
    "original_file",
];

const OPTIONAL_SELECTORS: [&str; 1] = ["lectures_button_fallback"];

fn default_download_path() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_timeout() -> u64 {
    10
}

fn default_retry_times() -> u32 {
    3
}

fn default_course_url() -> String {
    DEFAULT_COURSE_URL.to_string()
}

fn default_link_pattern() -> String {
    "/ultra/courses/".to_string()
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,
    /// Page-level wait timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,
    #[serde(default = "default_course_url")]
    pub course_url: String,
    /// Substring a content link's href must contain to be collected.
    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,
    #[serde(default)]
    pub delays: Delays,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut config = Self {
            username: None,
            password: None,
            download_path: default_download_path(),
            timeout: default_timeout(),
            retry_times: default_retry_times(),
            course_url: default_course_url(),
            link_pattern: default_link_pattern(),
            selectors: BTreeMap::new(),
            delays: Delays::default(),
        };
        config.fill_default_selectors();
        config
    }
}

impl AppConfig {
    /// Read `path`, falling back to the built-in defaults when it does not exist.
    pub fn load(path: &Path) -> SpiderResult<Self> {
        if !path.is_file() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.fill_default_selectors();
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> SpiderResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json_content = serde_json::to_string_pretty(self)?;
        fs::write(path, json_content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    fn fill_default_selectors(&mut self) {
        for (name, locator) in DEFAULT_SELECTORS.iter() {
            self.selectors
                .entry((*name).to_string())
                .or_insert_with(|| (*locator).to_string());
        }
    }

    pub fn selectors(&self) -> SpiderResult<Selectors> {
        Selectors::from_map(&self.selectors)
    }

    /// Wait used for page-level readiness and the login gate.
    pub fn page_wait(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_secs(self.timeout), self.delays.poll_interval())
    }

    /// Short wait for controls that may not exist.
    pub fn control_wait(&self) -> WaitPolicy {
        WaitPolicy::new(self.delays.control_timeout(), self.delays.poll_interval())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_times, self.delays.retry_base_delay())
    }
}

/// Fixed delays of the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    pub poll_interval_ms: u64,
    pub expand_delay_ms: u64,
    pub scroll_delay_ms: u64,
    pub menu_delay_ms: u64,
    pub post_download_delay_ms: u64,
    pub control_timeout_secs: u64,
    pub max_scroll_rounds: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            expand_delay_ms: 2000,
            scroll_delay_ms: 1000,
            menu_delay_ms: 1000,
            post_download_delay_ms: 2000,
            control_timeout_secs: 3,
            max_scroll_rounds: 20,
            retry_base_delay_ms: 1000,
        }
    }
}

impl Delays {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn expand_delay(&self) -> Duration {
        Duration::from_millis(self.expand_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    pub fn menu_delay(&self) -> Duration {
        Duration::from_millis(self.menu_delay_ms)
    }

    pub fn post_download_delay(&self) -> Duration {
        Duration::from_millis(self.post_download_delay_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Validated selector set, one [`Locator`] per logical name.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub username: Locator,
    pub password: Locator,
    pub login_button: Locator,
    pub lectures_button: Locator,
    pub lectures_button_fallback: Option<Locator>,
    pub week_buttons: Locator,
    /// Templated on `{content_id}`, the id of a week's content panel.
    pub content_links: Locator,
    pub page_ready: Locator,
    pub download_button: Locator,
    pub download_options: Locator,
    pub original_file: Locator,
}

impl Selectors {
    pub fn from_map(map: &BTreeMap<String, String>) -> SpiderResult<Self> {
        for name in map.keys() {
            if !REQUIRED_SELECTORS.contains(&name.as_str())
                && !OPTIONAL_SELECTORS.contains(&name.as_str())
            {
                warn!("Ignoring unknown selector '{name}'");
            }
        }

        let required = |name: &str| -> SpiderResult<Locator> {
            let raw = map
                .get(name)
                .ok_or_else(|| SpiderError::MissingSelector(name.to_string()))?;
            Locator::parse_named(name, raw)
        };
        let optional = |name: &str| -> SpiderResult<Option<Locator>> {
            map.get(name)
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| Locator::parse_named(name, raw))
                .transpose()
        };

        let content_links = required("content_links")?;
        if !content_links.is_template() {
            return Err(SpiderError::InvalidLocator {
                name: "content_links".to_string(),
                reason: "must contain the {content_id} placeholder".to_string(),
            });
        }

        Ok(Self {
            username: required("username")?,
            password: required("password")?,
            login_button: required("login_button")?,
            lectures_button: required("lectures_button")?,
            lectures_button_fallback: optional("lectures_button_fallback")?,
            week_buttons: required("week_buttons")?,
            content_links,
            page_ready: required("page_ready")?,
            download_button: required("download_button")?,
            download_options: required("download_options")?,
            original_file: required("original_file")?,
        })
    }
}
