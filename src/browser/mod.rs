//! Browser process management
//!
//! Launching is always fresh: the session manager never connects to an
//! existing browser, so a torn-down session cannot leak into a new one.

use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{BrowserError, Cin7Error, Result};

pub mod dom;

/// Launch a fresh chromium instance and start draining its event handler
///
/// The sandbox flags are required in the restricted environments this
/// client runs in (containers without user namespaces).
pub(crate) async fn launch(headless: bool) -> Result<(Browser, JoinHandle<()>)> {
    info!("🚀 launching browser (headless: {})...", headless);

    let builder = if headless {
        BrowserConfig::builder().new_headless_mode()
    } else {
        BrowserConfig::builder().with_head()
    };

    let config = builder
        .window_size(1024, 768)
        .args(vec![
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
        .map_err(|message| {
            error!("browser configuration failed: {}", message);
            Cin7Error::Browser(BrowserError::ConfigurationFailed { message })
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("failed to launch browser: {}", e);
        Cin7Error::Browser(BrowserError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("browser launched");

    // drain browser events in the background
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // brief pause so the browser state settles before the first command
    sleep(Duration::from_millis(300)).await;

    Ok((browser, handler_task))
}
