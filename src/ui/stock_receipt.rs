//! Stock-receipt intake workflow
//!
//! Entering a receipt means opening the credit note's transaction page,
//! reading the stock grid, and keying the received quantity (and batch
//! code, unless the SKU is FIFO-managed) into the quantity dialog of each
//! row, then approving the document.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::browser::dom;
use crate::config::Cin7Config;
use crate::error::Result;
use crate::session::SessionManager;
use crate::ui::selectors::{stock_grid, transaction};
use crate::ui::BatchOutcome;
use crate::utils::timezone::{format_in_timezone, ClockField};

const NAV_SETTLE_WAIT: Duration = Duration::from_secs(3);
const QTY_DIALOG_WAIT: Duration = Duration::from_secs(5);
const APPROVE_WAIT: Duration = Duration::from_secs(4);
const NAV_TIMEOUT: Duration = Duration::from_secs(30);
/// The row-save postback exposes no readiness signal; a fixed pause is
/// the only option (known fragility)
const ROW_SAVE_PAUSE: Duration = Duration::from_secs(1);

/// One stock receipt to enter
#[derive(Debug, Clone)]
pub struct StockReceiptItem {
    /// Credit note id
    pub id: String,
    /// When the stock physically arrived
    pub occurred_at: DateTime<Utc>,
    /// IANA timezone of the receiving branch
    pub timezone: String,
    pub lines: Vec<StockReceiptLine>,
}

#[derive(Debug, Clone)]
pub struct StockReceiptLine {
    pub sku: String,
    pub barcode: String,
    pub return_qty: f64,
    pub restock_qty: f64,
    pub batch: String,
}

impl StockReceiptItem {
    /// Receipts whose quantities all match can be completed through the
    /// API; any mismatch needs a manual entry in the console
    pub fn requires_ui(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.return_qty != line.restock_qty)
    }
}

/// A row scraped from the stock grid
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapedRow {
    sku: String,
    nth_child: usize,
    barcode: String,
}

pub struct StockReceiptFlow {
    session: Arc<SessionManager>,
    config: Arc<Cin7Config>,
}

impl StockReceiptFlow {
    pub fn new(session: Arc<SessionManager>, config: Arc<Cin7Config>) -> Self {
        Self { session, config }
    }

    /// Enter the given receipts one at a time on the shared page
    pub async fn run(&self, items: &[StockReceiptItem]) -> Result<Vec<BatchOutcome>> {
        let mut page = self.session.get_page().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            info!("entering stock receipt {}", item.id);
            match self.process_item(&page, item).await {
                Ok(()) => outcomes.push(BatchOutcome::ok(&item.id)),
                Err(e) => {
                    warn!("⚠️ stock receipt {} failed: {}", item.id, e);
                    outcomes.push(BatchOutcome::failed(&item.id, e.to_string()));
                    // the page is in an unknown state now; relaunching is
                    // more reliable than in-page recovery
                    self.session.close_browser().await;
                    page = self.session.get_page().await?;
                }
            }
        }

        self.session.close_browser().await;
        Ok(outcomes)
    }

    async fn process_item(&self, page: &Page, item: &StockReceiptItem) -> Result<()> {
        dom::settle_pending_navigation(page, NAV_SETTLE_WAIT).await?;

        let url = transaction::url(&self.config.options.app_link_ids.credit_notes, &item.id);
        dom::goto(page, &url).await?;

        // dates go in before any row postback can wipe them
        let date = format_in_timezone(&item.occurred_at, &item.timezone, ClockField::Date)?;
        let time = format_in_timezone(&item.occurred_at, &item.timezone, ClockField::Time)?;
        dom::clear_and_type(page, stock_grid::COMPLETED_DATE_FIELD, &date).await?;
        dom::clear_and_type(page, stock_grid::COMPLETED_TIME_FIELD, &time).await?;
        dom::clear_and_type(page, stock_grid::DOCUMENT_DATE_FIELD, &date).await?;
        dom::clear_and_type(page, stock_grid::DOCUMENT_TIME_FIELD, &time).await?;

        let rows = self.scrape_rows(page).await?;
        info!("stock receipt {}: {} grid rows", item.id, rows.len());

        for row in &rows {
            self.enter_row(page, item, row).await?;
        }

        // approve when the document offers it, otherwise plain save
        if dom::element_exists_within(page, transaction::APPROVE_BUTTON, APPROVE_WAIT).await {
            dom::click_and_wait_for_navigation(page, transaction::APPROVE_BUTTON, NAV_TIMEOUT)
                .await?;
        } else {
            dom::click_and_wait_for_navigation(page, transaction::SAVE_BUTTON, NAV_TIMEOUT)
                .await?;
        }

        Ok(())
    }

    async fn scrape_rows(&self, page: &Page) -> Result<Vec<ScrapedRow>> {
        let script = format!(
            r#"
            (() => {{
                const skuCells = document.querySelectorAll({sku});
                const commentCells = document.querySelectorAll({comments});
                return Array.from(skuCells).map((cell, index) => {{
                    const comment = (commentCells[index]?.innerHTML ?? '').trim();
                    return {{
                        sku: (cell.innerHTML ?? '').trim(),
                        nthChild: index + 2,
                        barcode: comment.includes('Barcode:')
                            ? (comment.split('Barcode:')[1] ?? '').trim()
                            : '',
                    }};
                }})
                .filter(row => row.sku !== '' && !row.sku.includes('<i>Search...</i>'));
            }})()
            "#,
            sku = serde_json::to_string(stock_grid::SKU_CELLS)?,
            comments = serde_json::to_string(stock_grid::COMMENT_CELLS)?,
        );
        dom::eval_json(page, script).await
    }

    async fn enter_row(
        &self,
        page: &Page,
        item: &StockReceiptItem,
        row: &ScrapedRow,
    ) -> Result<()> {
        dom::click(page, &stock_grid::qty_moved_cell(row.nth_child)).await?;
        dom::wait_for_selector(page, stock_grid::ACTUAL_QTY_FIELD, QTY_DIALOG_WAIT).await?;
        dom::set_value(page, stock_grid::ACTUAL_QTY_FIELD, "").await?;

        let fifo_managed = dom::is_read_only(page, stock_grid::BATCH_FIELD).await?;
        if !fifo_managed {
            dom::set_value(page, stock_grid::BATCH_FIELD, "").await?;
        }

        let matching = match_line(&item.lines, row);

        // intake reduces the outstanding quantity, so always the negated
        // absolute value
        let qty = matching.map(|line| line.restock_qty.abs()).unwrap_or(0.0);
        dom::type_into(page, stock_grid::ACTUAL_QTY_FIELD, &format_qty(-qty)).await?;

        if !fifo_managed {
            let batch = matching.map(|line| line.batch.as_str()).unwrap_or("");
            dom::type_into(page, stock_grid::BATCH_FIELD, batch).await?;
        }

        dom::click(page, stock_grid::SAVE_INTAKE_BUTTON).await?;
        sleep(ROW_SAVE_PAUSE).await;
        Ok(())
    }
}

/// Barcode equality wins; failing that, the caller's SKU must start with
/// the scraped SKU (the grid truncates long codes)
fn match_line<'a>(lines: &'a [StockReceiptLine], row: &ScrapedRow) -> Option<&'a StockReceiptLine> {
    lines.iter().find(|line| {
        if !row.barcode.is_empty() && row.barcode.eq_ignore_ascii_case(&line.barcode) {
            return true;
        }
        line.sku
            .to_lowercase()
            .starts_with(&row.sku.to_lowercase())
    })
}

fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{}", qty as i64)
    } else {
        format!("{}", qty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, barcode: &str) -> StockReceiptLine {
        StockReceiptLine {
            sku: sku.into(),
            barcode: barcode.into(),
            return_qty: 2.0,
            restock_qty: 1.0,
            batch: "B1".into(),
        }
    }

    fn row(sku: &str, barcode: &str) -> ScrapedRow {
        ScrapedRow {
            sku: sku.into(),
            nth_child: 2,
            barcode: barcode.into(),
        }
    }

    #[test]
    fn barcode_match_wins_over_sku_prefix() {
        let lines = vec![line("AAA-LONG", "111"), line("BBB-LONG", "222")];
        let matched = match_line(&lines, &row("AAA", "222")).unwrap();
        assert_eq!(matched.barcode, "222");
    }

    #[test]
    fn sku_prefix_match_is_case_insensitive() {
        let lines = vec![line("abC-Long-Code", "")];
        assert!(match_line(&lines, &row("ABC-", "")).is_some());
    }

    #[test]
    fn no_match_yields_none() {
        let lines = vec![line("AAA", "111")];
        assert!(match_line(&lines, &row("ZZZ", "999")).is_none());
    }

    #[test]
    fn quantity_is_always_negated_whole_number_when_integral() {
        assert_eq!(format_qty(-3.0), "-3");
        assert_eq!(format_qty(-0.0), "0");
        assert_eq!(format_qty(-2.5), "-2.5");
    }

    #[test]
    fn matching_quantities_do_not_require_ui() {
        let mut item = StockReceiptItem {
            id: "1".into(),
            occurred_at: Utc::now(),
            timezone: "UTC".into(),
            lines: vec![StockReceiptLine {
                sku: "A".into(),
                barcode: "".into(),
                return_qty: 2.0,
                restock_qty: 2.0,
                batch: "".into(),
            }],
        };
        assert!(!item.requires_ui());

        item.lines[0].restock_qty = 1.0;
        assert!(item.requires_ui());
    }
}
