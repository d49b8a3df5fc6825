//! Document void workflow
//!
//! Voiding is console-only: transaction page → admin sub-page → void
//! control, each step gated by a bounded selector wait. The same page
//! layout serves credit notes and sales orders, so the flow is shared.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::{info, warn};

use crate::browser::dom;
use crate::error::Result;
use crate::session::SessionManager;
use crate::ui::selectors::transaction;
use crate::ui::BatchOutcome;

const NAV_SETTLE_WAIT: Duration = Duration::from_secs(3);
const GATE_WAIT: Duration = Duration::from_secs(5);
const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Void the given documents one at a time, per-item isolated
pub(crate) async fn void_documents(
    session: &SessionManager,
    app_link_id: &str,
    ids: &[String],
) -> Result<Vec<BatchOutcome>> {
    let mut page = session.get_page().await?;
    let mut outcomes = Vec::with_capacity(ids.len());

    for id in ids {
        info!("voiding document {}", id);
        match void_one(session, &page, app_link_id, id).await {
            Ok(()) => outcomes.push(BatchOutcome::ok(id)),
            Err(e) => {
                warn!("⚠️ void of {} failed: {}", id, e);
                outcomes.push(BatchOutcome::failed(id, e.to_string()));
                session.close_browser().await;
                page = session.get_page().await?;
            }
        }
    }

    session.close_browser().await;
    Ok(outcomes)
}

async fn void_one(
    session: &SessionManager,
    page: &Page,
    app_link_id: &str,
    id: &str,
) -> Result<()> {
    // the void confirm dialog must always have an acceptor attached
    session.ensure_dialog_handler(page).await?;

    dom::settle_pending_navigation(page, NAV_SETTLE_WAIT).await?;
    dom::goto(page, &transaction::url(app_link_id, id)).await?;

    dom::wait_for_selector(page, transaction::ADMIN_BUTTON, GATE_WAIT).await?;
    dom::click_and_wait_for_navigation(page, transaction::ADMIN_BUTTON, NAV_TIMEOUT).await?;

    dom::wait_for_selector(page, transaction::VOID_BUTTON, GATE_WAIT).await?;
    dom::click_and_wait_for_navigation(page, transaction::VOID_BUTTON, NAV_TIMEOUT).await?;

    Ok(())
}
