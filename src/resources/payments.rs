//! Payments sub-client

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::error::{ApiError, Cin7Error, Result};
use crate::http::ApiChannel;
use crate::resources::types::{Payment, UpsertAck};

pub struct Payments {
    channel: Arc<ApiChannel>,
}

impl Payments {
    pub(crate) fn new(channel: Arc<ApiChannel>) -> Self {
        Self { channel }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let value = self.channel.get(format!("/Payments/{}", id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Payments attached to an order; lookup failures read as "none"
    pub async fn get_by_order_id(&self, order_id: i64) -> Result<Vec<Payment>> {
        match self
            .channel
            .get(format!("/Payments?where=orderId={}", order_id))
            .await
        {
            Ok(value) => Ok(serde_json::from_value(value).unwrap_or_default()),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Record payments; any rejected record fails the whole call
    pub async fn create(&self, payments: &[Value]) -> Result<()> {
        info!("creating {} payments", payments.len());
        let value = self
            .channel
            .post("/Payments", Value::Array(payments.to_vec()))
            .await
            .map_err(|e| {
                error!("error creating payments: {}", e);
                e
            })?;

        let acks: Vec<UpsertAck> = serde_json::from_value(value)?;
        if !acks.iter().all(|ack| ack.success) {
            let errors = acks
                .into_iter()
                .find(|ack| !ack.success)
                .map(|ack| ack.errors)
                .unwrap_or_default();
            return Err(Cin7Error::Api(ApiError::UpsertRejected { errors }));
        }
        Ok(())
    }

    /// Record payments, handing the per-record acknowledgements back
    pub async fn create_batch(&self, payments: &[Value]) -> Result<Vec<UpsertAck>> {
        let value = self
            .channel
            .post("/Payments", Value::Array(payments.to_vec()))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
