//! Credit notes sub-client
//!
//! Carries the stock-receipt intake entry point: receipts whose
//! quantities match are completed with one batched API update, the rest
//! go through the console workflow, and the combined results come back
//! in the caller's order.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde_json::{json, Value};
use tracing::info;

use crate::config::Cin7Config;
use crate::error::Result;
use crate::http::ApiChannel;
use crate::resources::types::{CreditNote, UpsertAck};
use crate::resources::{encode_ref, single_ack_id};
use crate::session::SessionManager;
use crate::ui::stock_receipt::{StockReceiptFlow, StockReceiptItem};
use crate::ui::{sort_to_input_order, void_flow, BatchOutcome};

pub struct CreditNotes {
    channel: Arc<ApiChannel>,
    session: Arc<SessionManager>,
    config: Arc<Cin7Config>,
}

impl CreditNotes {
    pub(crate) fn new(
        channel: Arc<ApiChannel>,
        session: Arc<SessionManager>,
        config: Arc<Cin7Config>,
    ) -> Self {
        Self {
            channel,
            session,
            config,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<CreditNote>> {
        let value = self.channel.get(format!("/CreditNotes/{}", id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_order_refs(&self, refs: &[String]) -> Result<Vec<CreditNote>> {
        let clause = refs
            .iter()
            .map(|r| format!("SalesReference='{}'", encode_ref(r)))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/CreditNotes?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<CreditNote>> {
        let clause = ids
            .iter()
            .map(|id| format!("Id={}", id))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/CreditNotes?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Raw filter-expression query, passed through verbatim
    pub async fn search(&self, query: &str) -> Result<Vec<CreditNote>> {
        let value = self
            .channel
            .get(format!("/CreditNotes?where={}", query))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create(&self, credit_note: &Value) -> Result<String> {
        info!("creating credit note");
        let value = self
            .channel
            .post("/CreditNotes", json!([credit_note]))
            .await?;
        single_ack_id(serde_json::from_value(value)?)
    }

    pub async fn create_batch(&self, credit_notes: &[Value]) -> Result<Vec<UpsertAck>> {
        let value = self
            .channel
            .post("/CreditNotes", Value::Array(credit_notes.to_vec()))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn update(&self, credit_note: &Value) -> Result<String> {
        info!("updating credit note");
        let value = self
            .channel
            .put("/CreditNotes", json!([credit_note]))
            .await?;
        single_ack_id(serde_json::from_value(value)?)
    }

    pub async fn update_batch(&self, credit_notes: &[Value]) -> Result<Vec<UpsertAck>> {
        let value = self
            .channel
            .put("/CreditNotes", Value::Array(credit_notes.to_vec()))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Enter stock receipts for the given credit notes
    ///
    /// Receipts whose return and restock quantities match line for line
    /// are completed with a single batched API update; mismatches need
    /// the console. One outcome per input, in input order.
    pub async fn create_stock_receipts(
        &self,
        receipts: &[StockReceiptItem],
    ) -> Result<Vec<BatchOutcome>> {
        let mut outcomes: Vec<BatchOutcome> = Vec::with_capacity(receipts.len());

        let (ui_required, api_only): (Vec<&StockReceiptItem>, Vec<&StockReceiptItem>) =
            receipts.iter().partition(|receipt| receipt.requires_ui());

        if !api_only.is_empty() {
            info!("completing {} stock receipts via the API", api_only.len());
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let payloads: Vec<Value> = api_only
                .iter()
                .map(|receipt| {
                    json!({
                        "id": receipt.id.parse::<i64>().map(Value::from)
                            .unwrap_or_else(|_| Value::String(receipt.id.clone())),
                        "completedDate": now,
                        "isApproved": true,
                    })
                })
                .collect();

            let acks = self.update_batch(&payloads).await?;
            for (index, receipt) in api_only.iter().enumerate() {
                match acks.get(index) {
                    Some(ack) if ack.success => outcomes.push(BatchOutcome::ok(&receipt.id)),
                    Some(ack) => {
                        outcomes.push(BatchOutcome::failed(&receipt.id, ack.errors.join(", ")))
                    }
                    None => outcomes.push(BatchOutcome::failed(
                        &receipt.id,
                        "no acknowledgement returned",
                    )),
                }
            }
        }

        if !ui_required.is_empty() {
            info!("entering {} stock receipts via the console", ui_required.len());
            let items: Vec<StockReceiptItem> =
                ui_required.into_iter().cloned().collect();
            let flow = StockReceiptFlow::new(self.session.clone(), self.config.clone());
            outcomes.extend(flow.run(&items).await?);
        }

        let input_ids: Vec<String> = receipts.iter().map(|r| r.id.clone()).collect();
        Ok(sort_to_input_order(outcomes, &input_ids))
    }

    /// Void credit notes through the console
    pub async fn void(&self, ids: &[String]) -> Result<Vec<BatchOutcome>> {
        void_flow::void_documents(
            &self.session,
            &self.config.options.app_link_ids.credit_notes,
            ids,
        )
        .await
    }
}

// ========== internal-comments codec ==========
// Credit notes carry their key-value block between `##` markers instead
// of the `#FL#` wrapper the sales orders use.

/// Decode the `##…##` key-value block of a credit note's comments
pub fn decode_marked_comments(comments: &str, separator: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    let block = Regex::new(r"##(.*?)##")
        .ok()
        .and_then(|re| {
            re.captures(comments)
                .and_then(|captures| captures.get(1).map(|m| m.as_str().to_string()))
        });
    let block = match block {
        Some(block) => block,
        None => return data,
    };

    for segment in block.split(separator) {
        if let Some((key, value)) = segment.split_once(": ") {
            data.insert(key.to_string(), value.to_string());
        }
    }
    data
}

/// Encode key-value data into the `##…##` comments block
pub fn encode_marked_comments(data: &BTreeMap<String, String>, separator: &str) -> String {
    let joined = data
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(separator);
    format!("##{}##", joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sales_orders::DEFAULT_COMMENT_SEPARATOR;

    fn sample() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("restockId".to_string(), "RS-5".to_string()),
            ("returnId".to_string(), "R-9".to_string()),
        ])
    }

    #[test]
    fn marked_comments_round_trip() {
        let encoded = encode_marked_comments(&sample(), DEFAULT_COMMENT_SEPARATOR);
        assert_eq!(encoded, "##restockId: RS-5#--#returnId: R-9##");
        assert_eq!(
            decode_marked_comments(&encoded, DEFAULT_COMMENT_SEPARATOR),
            sample()
        );
    }

    #[test]
    fn text_around_the_block_is_ignored() {
        let decoded = decode_marked_comments(
            "customer called ##returnId: R-9## follow up monday",
            DEFAULT_COMMENT_SEPARATOR,
        );
        assert_eq!(decoded.get("returnId").map(String::as_str), Some("R-9"));
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn comments_without_a_block_decode_to_nothing() {
        assert!(decode_marked_comments("plain text", DEFAULT_COMMENT_SEPARATOR).is_empty());
    }
}
