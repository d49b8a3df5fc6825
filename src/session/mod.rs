//! Browser session manager
//!
//! Owns the single browser instance and its logged-in console page.
//! Login runs a small state machine: launch → login page → submit
//! credentials → optional two-factor step → logged in. A session is
//! created lazily on the first `get_page` call, reused across UI
//! operations, and torn down explicitly after a batch or on fatal
//! navigation failure.
//!
//! Only this module mutates session state; workflow code reads the page
//! handle and requests teardown, nothing more.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::browser;
use crate::browser::dom;
use crate::config::Cin7Config;
use crate::error::{BrowserError, Cin7Error, ConfigError, Result};
use crate::ui::selectors::login;

pub mod totp;

const LOGIN_NAV_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Default)]
struct SessionState {
    browser: Option<Browser>,
    page: Option<Page>,
    logged_in: bool,
    handler_task: Option<JoinHandle<()>>,
    dialog_task: Option<JoinHandle<()>>,
}

/// Manages the one authenticated console session
pub struct SessionManager {
    config: Arc<Cin7Config>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(config: Arc<Cin7Config>) -> Self {
        Self {
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Return the logged-in page, logging in first if necessary
    ///
    /// Idempotent while a session is live: repeated calls hand back the
    /// same page without a second login sequence.
    pub async fn get_page(&self) -> Result<Page> {
        let mut state = self.state.lock().await;

        if state.logged_in {
            if let Some(page) = &state.page {
                debug!("reusing logged-in console page");
                return Ok(page.clone());
            }
        }

        let result = self.login(&mut state).await;
        if result.is_err() {
            // a half-built session must not survive a failed login
            Self::teardown(&mut state).await;
        }
        result
    }

    async fn login(&self, state: &mut SessionState) -> Result<Page> {
        let (browser, handler_task) = browser::launch(self.config.options.headless).await?;
        state.handler_task = Some(handler_task);
        state.browser = Some(browser);

        let page = state
            .browser
            .as_ref()
            .ok_or_else(|| Cin7Error::Other("browser vanished during launch".into()))?
            .new_page(login::URL)
            .await?;

        let url = page_url(&page).await?;
        if !url.contains(login::LOGIN_URL_MARKER) && !url.contains(login::TWO_FA_URL_MARKER) {
            return Err(Cin7Error::Browser(BrowserError::LoginFailed { url }));
        }

        let ui = self
            .config
            .auth
            .ui
            .as_ref()
            .ok_or(Cin7Error::Config(ConfigError::UiCredentialsMissing))?;

        info!("🔑 submitting console credentials...");
        dom::type_into(&page, login::USERNAME_FIELD, &ui.username).await?;
        dom::type_into(&page, login::PASSWORD_FIELD, &ui.password).await?;
        dom::click(&page, login::SUBMIT_BUTTON).await?;

        // DOM-ready is enough; the console long-polls and never goes
        // network idle
        match timeout(LOGIN_NAV_TIMEOUT, page.wait_for_navigation()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                let url = page_url(&page).await.unwrap_or_default();
                return Err(Cin7Error::Browser(BrowserError::LoginFailed { url }));
            }
        }

        let url = page_url(&page).await?;
        if url.contains(login::TWO_FA_URL_MARKER) {
            info!("🔐 two-factor challenge, submitting one-time code");
            let code = totp::generate(&ui.otp_secret, SystemTime::now()).map_err(|e| {
                Cin7Error::Config(ConfigError::InvalidOtpSecret {
                    reason: e.to_string(),
                })
            })?;
            dom::type_into(&page, login::TWO_FA_FIELD, &code).await?;
            dom::click(&page, login::TWO_FA_SUBMIT_BUTTON).await?;

            match timeout(LOGIN_NAV_TIMEOUT, page.wait_for_navigation()).await {
                Ok(Ok(_)) => {}
                _ => return Err(Cin7Error::Browser(BrowserError::TwoFactorFailed)),
            }
            let url = page_url(&page).await?;
            if url.contains(login::TWO_FA_URL_MARKER) {
                return Err(Cin7Error::Browser(BrowserError::TwoFactorFailed));
            }
        }

        Self::install_dialog_handler(state, &page).await?;
        state.page = Some(page.clone());
        state.logged_in = true;
        info!("✓ console session established");

        Ok(page)
    }

    /// Make sure exactly one auto-accepting dialog handler is attached
    ///
    /// The console raises blocking confirm dialogs (e.g. on void) that
    /// would hang headless execution. Reinstalling replaces any existing
    /// listener instead of stacking a second one.
    pub async fn ensure_dialog_handler(&self, page: &Page) -> Result<()> {
        let mut state = self.state.lock().await;
        Self::install_dialog_handler(&mut state, page).await
    }

    async fn install_dialog_handler(state: &mut SessionState, page: &Page) -> Result<()> {
        if let Some(task) = state.dialog_task.take() {
            task.abort();
        }

        let mut dialogs = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await?;
        let handler_page = page.clone();
        state.dialog_task = Some(tokio::spawn(async move {
            while let Some(dialog) = dialogs.next().await {
                debug!("dialog message: {}", dialog.message);
                let accept = HandleJavaScriptDialogParams::builder().accept(true).build();
                match accept {
                    Ok(params) => {
                        if let Err(e) = handler_page.execute(params).await {
                            warn!("⚠️ failed to accept dialog: {}", e);
                        }
                    }
                    Err(e) => warn!("⚠️ failed to build dialog response: {}", e),
                }
            }
        }));

        Ok(())
    }

    /// Tear the session down; afterwards the manager is indistinguishable
    /// from one that never started
    pub async fn close_browser(&self) {
        let mut state = self.state.lock().await;
        Self::teardown(&mut state).await;
    }

    async fn teardown(state: &mut SessionState) {
        if let Some(task) = state.dialog_task.take() {
            task.abort();
        }

        // Reset fields before attempting the close so a failing close
        // still leaves a clean slate.
        let browser = state.browser.take();
        let handler_task = state.handler_task.take();
        state.page = None;
        state.logged_in = false;

        if let Some(mut browser) = browser {
            info!("closing browser");
            if let Err(e) = browser.close().await {
                warn!("⚠️ browser did not close cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("browser process wait failed: {}", e);
            }
        }

        if let Some(task) = handler_task {
            task.abort();
        }
    }

    /// Whether a logged-in session currently exists
    pub async fn is_active(&self) -> bool {
        let state = self.state.lock().await;
        state.logged_in && state.page.is_some()
    }
}

async fn page_url(page: &Page) -> Result<String> {
    Ok(page.url().await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cin7Config;

    #[tokio::test]
    async fn a_fresh_manager_has_no_session() {
        let manager = SessionManager::new(Arc::new(Cin7Config::default()));
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn closing_a_never_started_session_is_a_no_op() {
        let manager = SessionManager::new(Arc::new(Cin7Config::default()));
        manager.close_browser().await;
        assert!(!manager.is_active().await);
    }
}
