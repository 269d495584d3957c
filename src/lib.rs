// src/lib.rs

pub mod auth;
pub mod browser;
pub mod config;
pub mod credentials;
pub mod discover;
pub mod download;
pub mod driver;
pub mod error;
pub mod locator;
pub mod logging;
pub mod manifest;
pub mod spider;
pub mod wait;

pub use discover::ContentItem;
pub use error::{SpiderError, SpiderResult};
