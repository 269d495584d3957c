// src/wait.rs

use crate::{
    driver::{PageDriver, PageElement},
    error::{SpiderError, SpiderResult},
    locator::Locator,
};
use log::{debug, warn};
use std::{future::Future, time::Duration};
use tokio::time::{sleep, Instant};

const MIN_POLL: Duration = Duration::from_millis(1);

/// How long to poll for an element, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_millis(500))
    }
}

/// Bounded retries with exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// Delay before attempt `n + 1`, after `n` failures.
    pub fn backoff(&self, failures: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(failures.saturating_sub(1)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Click,
    ClickToDownload,
}

impl Action {
    async fn perform<E: PageElement>(self, element: &E) -> SpiderResult<()> {
        match self {
            Action::Click => element.click().await,
            Action::ClickToDownload => element.click_to_download().await,
        }
    }
}

/// Poll until `locator` matches, returning the first match.
///
/// The final query happens at the deadline; sleeps never overshoot it.
pub async fn wait_for_element<D: PageDriver>(
    driver: &D,
    locator: &Locator,
    policy: WaitPolicy,
) -> SpiderResult<D::Element> {
    let deadline = Instant::now() + policy.timeout;
    loop {
        match driver.find_all(locator).await {
            Ok(found) => {
                if let Some(element) = found.into_iter().next() {
                    return Ok(element);
                }
            }
            Err(e) => debug!("Query for '{locator}' failed: {e}"),
        }

        if !pause_until_next_poll(deadline, policy.poll).await {
            break;
        }
    }

    Err(SpiderError::Timeout {
        locator: locator.to_string(),
        timeout: policy.timeout,
    })
}

/// Wait for `locator` and perform `action` on it.
///
/// A click that fails is logged and the element is looked up again on the
/// next poll. The outcome of the click (navigation, download) is not checked.
pub async fn wait_and_act<D: PageDriver>(
    driver: &D,
    locator: &Locator,
    action: Action,
    policy: WaitPolicy,
) -> SpiderResult<()> {
    let deadline = Instant::now() + policy.timeout;
    loop {
        match driver.find_all(locator).await {
            Ok(found) => {
                if let Some(element) = found.into_iter().next() {
                    match action.perform(&element).await {
                        Ok(()) => return Ok(()),
                        Err(e) => debug!("{action:?} on '{locator}' failed: {e}"),
                    }
                }
            }
            Err(e) => debug!("Query for '{locator}' failed: {e}"),
        }

        if !pause_until_next_poll(deadline, policy.poll).await {
            break;
        }
    }

    Err(SpiderError::Timeout {
        locator: locator.to_string(),
        timeout: policy.timeout,
    })
}

/// Sleep one poll interval, clamped to the deadline. Returns `false` once the
/// deadline has already passed.
async fn pause_until_next_poll(deadline: Instant, poll: Duration) -> bool {
    let now = Instant::now();
    if now >= deadline {
        return false;
    }
    sleep(poll.max(MIN_POLL).min(deadline - now)).await;
    true
}

/// Run `operation` up to `policy.attempts` times, backing off between failures.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: RetryPolicy,
    what: &str,
    operation: F,
) -> SpiderResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = SpiderResult<T>>,
{
    let mut failures = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                failures += 1;
                if failures >= policy.attempts {
                    return Err(e);
                }
                let delay = policy.backoff(failures);
                warn!(
                    "{what} failed (attempt {failures}/{}): {e}, retrying in {delay:?}",
                    policy.attempts
                );
                sleep(delay).await;
            }
        }
    }
}
