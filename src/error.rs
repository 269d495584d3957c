// src/error.rs

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("Could not find element '{locator}'")]
    ElementNotFound { locator: String },
    #[error("Element '{locator}' did not appear or was not clickable within {timeout:?}")]
    Timeout { locator: String, timeout: Duration },
    #[error("Selector '{name}' is not a valid locator: {reason}")]
    InvalidLocator { name: String, reason: String },
    #[error("Selector '{0}' is missing from the configuration")]
    MissingSelector(String),
    #[error("Page driver error: {0}")]
    Driver(String),
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Input(String),
    #[error("Logger setup failed: {0}")]
    Logger(String),
}

pub type SpiderResult<T> = Result<T, SpiderError>;
