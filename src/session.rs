//! The page-driving boundary: something that can load the yield curve page,
//! answer element queries, fill in the date filter and hand back the HTML.

use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::{Error, Result};

/// One live page-driving session. Errors that mean the session itself is gone
/// must be reported as [`Error::SessionDeath`] so the caller can replace it.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Loads `url` as the current page.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Whether the current page has an element matching `selector`.
    async fn has_element(&mut self, selector: &str) -> Result<bool>;

    /// Sets the value of the `input` field, activates `button`, and makes the
    /// resulting page current.
    async fn submit_filter(&mut self, input: &str, button: &str, value: &str) -> Result<()>;

    /// HTML of the current page.
    async fn page_source(&mut self) -> Result<String>;

    /// Releases the session.
    async fn close(self) -> Result<()>;
}

/// Opens fresh sessions, both at start-up and after a session dies.
#[allow(async_fn_in_trait)]
pub trait SessionFactory {
    type Session: Session;

    async fn open(&self) -> Result<Self::Session>;
}

/// Polls `session` every `interval` until `selector` shows up on the current
/// page or `limit` runs out. Errors from the session end the wait immediately.
pub async fn wait_for_element<S: Session>(
    session: &mut S,
    selector: &str,
    limit: Duration,
    interval: Duration,
) -> Result<()> {
    let polling = async {
        loop {
            if session.has_element(selector).await? {
                return Ok(());
            }
            sleep(interval).await;
        }
    };

    match timeout(limit, polling).await {
        Ok(res) => res,
        Err(_) => Err(Error::WaitTimeout(selector.to_string())),
    }
}
