// src/credentials.rs

use crate::{
    config::AppConfig,
    error::{SpiderError, SpiderResult},
};
use log::info;
use std::{
    fmt,
    io::{self, Write},
    path::Path,
};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where interactive answers come from.
pub trait Prompter {
    fn line(&mut self, prompt: &str) -> SpiderResult<String>;

    /// Like [`Prompter::line`], without echoing the input.
    fn secret(&mut self, prompt: &str) -> SpiderResult<String>;
}

/// Reads answers from the terminal.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn line(&mut self, prompt: &str) -> SpiderResult<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(SpiderError::Input("standard input closed".to_string()));
        }
        Ok(input.trim().to_string())
    }

    fn secret(&mut self, prompt: &str) -> SpiderResult<String> {
        Ok(rpassword::prompt_password(prompt)?)
    }
}

/// Credentials from the config, or asked for once and written back to `path`.
pub fn resolve_credentials(
    config: &mut AppConfig,
    path: &Path,
    prompter: &mut dyn Prompter,
) -> SpiderResult<Credentials> {
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        if !username.is_empty() {
            info!("Using credentials from {}", path.display());
            return Ok(Credentials::new(username.clone(), password.clone()));
        }
    }

    let username = prompter.line("Enter your username: ")?;
    if username.is_empty() {
        return Err(SpiderError::Input("username must not be empty".to_string()));
    }
    let password = prompter.secret("Enter your password: ")?;

    config.username = Some(username.clone());
    config.password = Some(password.clone());
    config.save(path)?;

    Ok(Credentials::new(username, password))
}
