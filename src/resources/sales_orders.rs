//! Sales orders sub-client

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Cin7Config;
use crate::error::Result;
use crate::http::ApiChannel;
use crate::resources::types::{SalesOrder, UpsertAck};
use crate::resources::{encode_ref, single_ack_id};
use crate::session::SessionManager;
use crate::ui::date_fix::{DateFix, DateFixFlow};
use crate::ui::{void_flow, BatchOutcome};

/// Separator between key-value segments in the internal-comments block
pub const DEFAULT_COMMENT_SEPARATOR: &str = "#--#";

pub struct SalesOrders {
    channel: Arc<ApiChannel>,
    session: Arc<SessionManager>,
    config: Arc<Cin7Config>,
}

impl SalesOrders {
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

    pub async fn get(&self, id: &str) -> Result<Option<SalesOrder>> {
        let value = self.channel.get(format!("/SalesOrders/{}", id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_ref(&self, reference: &str) -> Result<Option<SalesOrder>> {
        let value = self
            .channel
            .get(format!(
                "/SalesOrders?where=Reference='{}'",
                encode_ref(reference)
            ))
            .await?;
        let orders: Vec<SalesOrder> = serde_json::from_value(value)?;
        Ok(orders.into_iter().find(|order| order.reference == reference))
    }

    pub async fn get_by_refs(&self, refs: &[String]) -> Result<Vec<SalesOrder>> {
        debug!("getting sales orders by refs {:?}", refs);
        let clause = refs
            .iter()
            .map(|r| format!("Reference='{}'", encode_ref(r)))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/SalesOrders?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<SalesOrder>> {
        let clause = ids
            .iter()
            .map(|id| format!("Id={}", id))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/SalesOrders?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create one order; returns the new id or the vendor's errors
    pub async fn create(&self, sales_order: &Value) -> Result<String> {
        info!("creating sales order");
        let value = self
            .channel
            .post("/SalesOrders", json!([sales_order]))
            .await?;
        single_ack_id(serde_json::from_value(value)?)
    }

    pub async fn create_batch(&self, sales_orders: &[Value]) -> Result<Vec<UpsertAck>> {
        let value = self
            .channel
            .post("/SalesOrders", Value::Array(sales_orders.to_vec()))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn update(&self, sales_order: &Value) -> Result<String> {
        info!("updating sales order");
        let value = self
            .channel
            .put("/SalesOrders", json!([sales_order]))
            .await?;
        single_ack_id(serde_json::from_value(value)?)
    }

    pub async fn update_batch(&self, sales_orders: &[Value]) -> Result<Vec<UpsertAck>> {
        let value = self
            .channel
            .put("/SalesOrders", Value::Array(sales_orders.to_vec()))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Orders modified within the window, walking every result page
    pub async fn get_recent(&self, time_window: Duration) -> Result<Vec<SalesOrder>> {
        let window = chrono::Duration::from_std(time_window)
            .unwrap_or_else(|_| chrono::Duration::zero());
        let since = (Utc::now() - window).to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut orders: Vec<SalesOrder> = Vec::new();
        let mut page = 1u32;
        loop {
            debug!("getting sales orders page {}", page);
            let value = self
                .channel
                .get(format!(
                    "/SalesOrders?where=modifiedDate >= '{}'&page={}",
                    since, page
                ))
                .await?;
            let batch: Vec<SalesOrder> = serde_json::from_value(value)?;
            if batch.is_empty() {
                break;
            }
            orders.extend(batch);
            page += 1;
        }
        Ok(orders)
    }

    /// Void orders through the console
    pub async fn void(&self, ids: &[String]) -> Result<Vec<BatchOutcome>> {
        void_flow::void_documents(
            &self.session,
            &self.config.options.app_link_ids.sales_orders,
            ids,
        )
        .await
    }

    /// Correct completed/invoice timestamps through the console
    pub async fn fix_dates(&self, items: &[DateFix]) -> Result<Vec<BatchOutcome>> {
        DateFixFlow::new(self.session.clone(), self.config.clone())
            .run(items)
            .await
    }
}

// ========== internal-comments codec ==========

/// Decode the `#FL#…#FL#` key-value block of an order's internal comments
pub fn decode_internal_comments(comments: &str, separator: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    for segment in comments.split(separator) {
        let segment = segment.replacen("#FL#", "", 1);
        if let Some((key, value)) = segment.split_once(": ") {
            data.insert(key.to_string(), value.to_string());
        }
    }
    data
}

/// Encode key-value data into the `#FL#…#FL#` comments block
pub fn encode_internal_comments(data: &BTreeMap<String, String>, separator: &str) -> String {
    let joined = data
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(separator);
    format!("#FL#{}#FL#", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("fulfilmentOrderId".to_string(), "FO-204".to_string()),
            ("returnId".to_string(), "R-77".to_string()),
        ])
    }

    #[test]
    fn comments_round_trip() {
        let encoded = encode_internal_comments(&sample(), DEFAULT_COMMENT_SEPARATOR);
        assert_eq!(
            encoded,
            "#FL#fulfilmentOrderId: FO-204#--#returnId: R-77#FL#"
        );
        assert_eq!(
            decode_internal_comments(&encoded, DEFAULT_COMMENT_SEPARATOR),
            sample()
        );
    }

    #[test]
    fn comments_round_trip_with_custom_separator() {
        let encoded = encode_internal_comments(&sample(), "||");
        assert_eq!(decode_internal_comments(&encoded, "||"), sample());
    }

    #[test]
    fn segments_without_a_key_value_shape_are_ignored() {
        let decoded = decode_internal_comments(
            "note to warehouse#--##FL#returnId: R-1",
            DEFAULT_COMMENT_SEPARATOR,
        );
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("returnId").map(String::as_str), Some("R-1"));
    }

    #[test]
    fn empty_map_round_trips_to_empty_map() {
        let encoded = encode_internal_comments(&BTreeMap::new(), DEFAULT_COMMENT_SEPARATOR);
        assert!(decode_internal_comments(&encoded, DEFAULT_COMMENT_SEPARATOR).is_empty());
    }
}
