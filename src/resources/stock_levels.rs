//! Stock levels sub-client

use std::sync::Arc;

use crate::error::Result;
use crate::http::{ApiChannel, ApiRequest};
use crate::resources::types::Stock;

#[derive(Clone, Copy, Debug)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Sort order for stock queries
#[derive(Clone, Debug)]
pub struct StockOrder {
    pub field: String,
    pub direction: OrderDirection,
}

pub struct StockLevels {
    channel: Arc<ApiChannel>,
}

impl StockLevels {
    pub(crate) fn new(channel: Arc<ApiChannel>) -> Self {
        Self { channel }
    }

    /// Query stock levels; `where_clause` is a vendor filter expression
    /// passed through verbatim
    pub async fn query(
        &self,
        where_clause: &str,
        page: u32,
        rows: u32,
        order: Option<StockOrder>,
    ) -> Result<Vec<Stock>> {
        let mut request = ApiRequest::get("/Stock")
            .with_query("where", where_clause)
            .with_query("page", page.to_string())
            .with_query("rows", rows.to_string());
        if let Some(order) = order {
            request = request.with_query(
                "order",
                format!("{} {}", order.field, order.direction.as_str()),
            );
        }

        let value = self.channel.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}
