// src/auth.rs

use crate::{
    config::Selectors,
    credentials::Credentials,
    driver::{PageDriver, PageElement},
    error::{SpiderError, SpiderResult},
    locator::Locator,
    wait::{wait_for_element, WaitPolicy},
};
use log::info;

/// Fills the login form on the current page and submits it.
pub struct Authenticator<'a, D: PageDriver> {
    driver: &'a D,
    selectors: &'a Selectors,
    wait: WaitPolicy,
}

impl<'a, D: PageDriver> Authenticator<'a, D> {
    pub fn new(driver: &'a D, selectors: &'a Selectors, wait: WaitPolicy) -> Self {
        Self {
            driver,
            selectors,
            wait,
        }
    }

    /// Any missing field is an error; there is no partial login.
    pub async fn login(&self, credentials: &Credentials) -> SpiderResult<()> {
        let username_field = wait_for_element(self.driver, &self.selectors.username, self.wait)
            .await
            .map_err(|_| not_found(&self.selectors.username))?;
        let password_field = self.find(&self.selectors.password).await?;
        let login_button = self.find(&self.selectors.login_button).await?;

        username_field.send_keys(credentials.username()).await?;
        password_field.send_keys(credentials.password()).await?;
        login_button.click().await?;

        info!("Submitted login form as {}", credentials.username());
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> SpiderResult<D::Element> {
        self.driver
            .find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(locator))
    }
}

fn not_found(locator: &Locator) -> SpiderError {
    SpiderError::ElementNotFound {
        locator: locator.to_string(),
    }
}
