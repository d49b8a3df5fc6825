//! Date correction workflow
//!
//! The REST API rejects updates to completed/invoice timestamps on
//! approved orders, so corrections go through the console form. One
//! guard matters here: when both delivery name fields are empty the
//! vendor's save action silently corrupts the record, so such items are
//! reported as failed without ever submitting.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::browser::dom;
use crate::config::Cin7Config;
use crate::error::Result;
use crate::session::SessionManager;
use crate::ui::selectors::{order_form, transaction};
use crate::ui::BatchOutcome;
use crate::utils::timezone::{format_in_timezone, ClockField};

const NAV_SETTLE_WAIT: Duration = Duration::from_secs(3);
const PAGE_READY_WAIT: Duration = Duration::from_secs(10);
const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// One order whose timestamps need correcting
#[derive(Debug, Clone)]
pub struct DateFix {
    /// Sales order id
    pub id: String,
    pub completed_at: DateTime<Utc>,
    pub invoiced_at: DateTime<Utc>,
    /// IANA timezone the form fields should show
    pub timezone: String,
}

enum ItemStatus {
    Saved,
    /// The guard tripped; nothing was submitted and the page is intact
    Rejected(String),
}

pub struct DateFixFlow {
    session: Arc<SessionManager>,
    config: Arc<Cin7Config>,
}

impl DateFixFlow {
    pub fn new(session: Arc<SessionManager>, config: Arc<Cin7Config>) -> Self {
        Self { session, config }
    }

    pub async fn run(&self, items: &[DateFix]) -> Result<Vec<BatchOutcome>> {
        let mut page = self.session.get_page().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            info!("correcting dates on order {}", item.id);
            match self.process_item(&page, item).await {
                Ok(ItemStatus::Saved) => outcomes.push(BatchOutcome::ok(&item.id)),
                Ok(ItemStatus::Rejected(reason)) => {
                    // nothing was submitted, the session stays up
                    warn!("⚠️ order {} not saved: {}", item.id, reason);
                    outcomes.push(BatchOutcome::failed(&item.id, reason));
                }
                Err(e) => {
                    warn!("⚠️ date correction on {} failed: {}", item.id, e);
                    outcomes.push(BatchOutcome::failed(&item.id, e.to_string()));
                    self.session.close_browser().await;
                    page = self.session.get_page().await?;
                }
            }
        }

        self.session.close_browser().await;
        Ok(outcomes)
    }

    async fn process_item(&self, page: &Page, item: &DateFix) -> Result<ItemStatus> {
        dom::settle_pending_navigation(page, NAV_SETTLE_WAIT).await?;

        let url = transaction::url(&self.config.options.app_link_ids.sales_orders, &item.id);
        dom::goto(page, &url).await?;
        // the form is usable once its save control is rendered
        dom::wait_for_selector(page, transaction::SAVE_BUTTON, PAGE_READY_WAIT).await?;

        let completed_date =
            format_in_timezone(&item.completed_at, &item.timezone, ClockField::Date)?;
        let completed_time =
            format_in_timezone(&item.completed_at, &item.timezone, ClockField::Time)?;
        let invoice_date = format_in_timezone(&item.invoiced_at, &item.timezone, ClockField::Date)?;
        let invoice_time = format_in_timezone(&item.invoiced_at, &item.timezone, ClockField::Time)?;

        dom::clear_and_type(page, order_form::COMPLETED_DATE_FIELD, &completed_date).await?;
        dom::clear_and_type(page, order_form::COMPLETED_TIME_FIELD, &completed_time).await?;
        dom::clear_and_type(page, order_form::INVOICE_DATE_FIELD, &invoice_date).await?;
        dom::clear_and_type(page, order_form::INVOICE_TIME_FIELD, &invoice_time).await?;

        let first_name = dom::read_value(page, order_form::DELIVERY_FIRST_NAME_FIELD).await?;
        let last_name = dom::read_value(page, order_form::DELIVERY_LAST_NAME_FIELD).await?;
        if both_names_empty(&first_name, &last_name) {
            return Ok(ItemStatus::Rejected(
                "delivery first name and last name are both empty; saving would corrupt the order"
                    .to_string(),
            ));
        }

        dom::scroll_into_view(page, transaction::SAVE_BUTTON).await?;
        dom::click_and_wait_for_navigation(page, transaction::SAVE_BUTTON, NAV_TIMEOUT).await?;

        Ok(ItemStatus::Saved)
    }
}

fn both_names_empty(first: &str, last: &str) -> bool {
    first.trim().is_empty() && last.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_trips_only_when_both_names_are_empty() {
        assert!(both_names_empty("", ""));
        assert!(both_names_empty("  ", "\t"));
        assert!(!both_names_empty("Ana", ""));
        assert!(!both_names_empty("", "Ortiz"));
    }
}
