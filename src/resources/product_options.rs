//! Product options sub-client

use std::sync::Arc;

use crate::error::Result;
use crate::http::ApiChannel;
use crate::resources::encode_ref;
use crate::resources::types::ProductOption;

pub struct ProductOptions {
    channel: Arc<ApiChannel>,
}

impl ProductOptions {
    pub(crate) fn new(channel: Arc<ApiChannel>) -> Self {
        Self { channel }
    }

    pub async fn get(&self, id: &str) -> Result<Option<ProductOption>> {
        let value = self.channel.get(format!("/ProductOptions/{}", id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_barcodes(&self, barcodes: &[String]) -> Result<Vec<ProductOption>> {
        let clause = barcodes
            .iter()
            .map(|barcode| format!("barcode='{}'", encode_ref(barcode)))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/ProductOptions?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ProductOption>> {
        let clause = ids
            .iter()
            .map(|id| format!("Id={}", id))
            .collect::<Vec<_>>()
            .join(" OR ");
        let value = self
            .channel
            .get(format!("/ProductOptions?where={}", clause))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Raw filter-expression query, passed through verbatim
    pub async fn search(&self, query: &str) -> Result<Vec<ProductOption>> {
        let value = self
            .channel
            .get(format!("/ProductOptions?where={}", query))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
