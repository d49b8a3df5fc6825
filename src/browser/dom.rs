//! Generic page-interaction primitives
//!
//! Workflow code talks to vendor pages exclusively through these helpers
//! plus the selector catalogs in `ui::selectors`, so the page coupling
//! stays in one substitutable place. Waits are condition-based wherever a
//! condition exists; the few fixed pauses left are where the vendor page
//! exposes no readiness signal at all.

use std::time::Duration;

use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::error::{Cin7Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll for a selector until it appears or the wait elapses
pub async fn wait_for_selector(page: &Page, selector: &str, wait: Duration) -> Result<Element> {
    let deadline = Instant::now() + wait;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        if Instant::now() >= deadline {
            return Err(Cin7Error::selector_timeout(
                selector,
                wait.as_millis() as u64,
            ));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Probe for an element without treating absence as an error
///
/// This is the expected-path branch test ("is approve available?"); use it
/// instead of catching a timeout error.
pub async fn element_exists_within(page: &Page, selector: &str, wait: Duration) -> bool {
    wait_for_selector(page, selector, wait).await.is_ok()
}

pub async fn click(page: &Page, selector: &str) -> Result<()> {
    let element = page.find_element(selector).await?;
    element.click().await?;
    Ok(())
}

/// Focus the element and send keystrokes to it
pub async fn type_into(page: &Page, selector: &str, text: &str) -> Result<()> {
    let element = page.find_element(selector).await?;
    element.click().await?;
    element.type_str(text).await?;
    Ok(())
}

/// Blank the field first so stale values never survive, then type
pub async fn clear_and_type(page: &Page, selector: &str, text: &str) -> Result<()> {
    set_value(page, selector, "").await?;
    type_into(page, selector, text).await
}

/// Set an input's value directly through the DOM
pub async fn set_value(page: &Page, selector: &str, value: &str) -> Result<()> {
    let script = format!(
        "(() => {{ const input = document.querySelector({sel}); if (input) input.value = {val}; }})()",
        sel = serde_json::to_string(selector)?,
        val = serde_json::to_string(value)?,
    );
    page.evaluate(script).await?;
    Ok(())
}

/// Read an input's current value; missing elements read as empty
pub async fn read_value(page: &Page, selector: &str) -> Result<String> {
    let script = format!(
        "(() => {{ const input = document.querySelector({sel}); return input ? input.value : ''; }})()",
        sel = serde_json::to_string(selector)?,
    );
    eval_json(page, script).await
}

/// Whether an input is read-only (e.g. the batch field of a FIFO-managed SKU)
pub async fn is_read_only(page: &Page, selector: &str) -> Result<bool> {
    let script = format!(
        "(() => {{ const input = document.querySelector({sel}); return !!(input && input.readOnly); }})()",
        sel = serde_json::to_string(selector)?,
    );
    eval_json(page, script).await
}

/// Run a page script and deserialize its JSON result
pub async fn eval_json<T: DeserializeOwned>(page: &Page, script: impl Into<String>) -> Result<T> {
    let result = page.evaluate(script.into()).await?;
    result
        .into_value()
        .map_err(|e| Cin7Error::eval_failed(e.to_string()))
}

pub async fn scroll_into_view(page: &Page, selector: &str) -> Result<()> {
    let element = page.find_element(selector).await?;
    element.scroll_into_view().await?;
    Ok(())
}

pub async fn goto(page: &Page, url: &str) -> Result<()> {
    debug!("navigating to {}", url);
    page.goto(url)
        .await
        .map_err(|e| Cin7Error::navigation_failed(url, e))?;
    Ok(())
}

/// Let any dangling navigation from the previous item settle
///
/// The vendor's pages routinely leave a pending navigation behind, so a
/// timeout here is not an error: log it, give the page a moment, move on.
pub async fn settle_pending_navigation(page: &Page, wait: Duration) -> Result<()> {
    match timeout(wait, page.wait_for_navigation()).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => {
            warn!(
                "⚠️ navigation still pending after {}ms, continuing",
                wait.as_millis()
            );
            sleep(Duration::from_secs(1)).await;
            Ok(())
        }
    }
}

/// Click a control that triggers a page load and wait for it to finish
pub async fn click_and_wait_for_navigation(
    page: &Page,
    selector: &str,
    wait: Duration,
) -> Result<()> {
    click(page, selector).await?;
    match timeout(wait, page.wait_for_navigation()).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(Cin7Error::navigation_timeout(wait.as_millis() as u64)),
    }
}
