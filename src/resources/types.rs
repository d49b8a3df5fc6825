//! Typed records for the vendor's business objects
//!
//! Read payloads deserialize into these; write payloads stay as caller-
//! built JSON maps because the API is partial-update oriented. Every
//! field is defaulted: the vendor omits fields freely depending on the
//! endpoint and account configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-record acknowledgement returned by create/update calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertAck {
    pub index: i64,
    pub success: bool,
    pub id: i64,
    pub code: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrder {
    pub id: i64,
    pub reference: String,

    pub created_date: String,
    pub modified_date: String,

    pub line_items: Vec<SalesOrderItem>,
    pub product_total: f64,

    pub cost_center: String,
    pub alternative_tax_rate: String,
    pub stage: String,
    pub member_id: i64,
    pub member_email: String,
    pub payment_terms: String,
    pub branch_id: i64,

    pub delivery_first_name: String,
    pub delivery_last_name: String,
    pub delivery_company: String,
    pub delivery_address1: String,
    pub delivery_address2: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_postal_code: String,
    pub delivery_country: String,
    pub email: String,
    pub phone: String,
    pub customer_order_no: String,

    pub tracking_code: String,
    pub dispatched_date: String,
    pub logistics_carrier: String,
    pub estimated_delivery_date: String,

    pub invoice_date: String,
    pub discount_total: f64,
    pub discount_description: String,
    pub freight_total: f64,
    pub freight_description: String,
    pub total: f64,
    /// "Incl", "Excl" or "Exempt"
    pub tax_status: String,
    pub tax_rate: f64,

    pub custom_fields: HashMap<String, Value>,

    pub internal_comments: String,
    pub delivery_instructions: String,

    pub logistics_status: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrderItem {
    pub code: Option<String>,
    pub name: Option<String>,
    pub product_option_id: Option<i64>,
    pub line_comments: Option<String>,
    pub qty: f64,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub unit_price: f64,
    pub discount: f64,
    pub qty_shipped: Option<f64>,
    pub actual_qty: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditNote {
    pub id: i64,
    pub reference: String,
    /// Reference of the sales order being credited
    pub sales_reference: String,
    pub created_date: String,
    pub modified_date: String,

    pub line_items: Vec<CreditNoteItem>,

    pub member_email: String,

    pub invoice_date: String,
    pub completed_date: String,
    pub discount_total: f64,
    pub discount_description: String,
    pub freight_total: f64,
    pub freight_description: String,
    pub total: f64,
    pub branch_id: i64,

    pub is_approved: bool,

    pub internal_comments: String,
    pub surcharge: f64,
    pub surcharge_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditNoteItem {
    pub code: Option<String>,
    pub name: Option<String>,
    pub product_option_id: Option<i64>,
    pub line_comments: Option<String>,
    pub qty: f64,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub unit_price: f64,
    pub discount: f64,
    pub qty_shipped: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub id: String,
    pub transaction_ref: String,
    pub amount: f64,
    pub method: String,
    pub comments: String,
    pub order_id: String,
    pub order_ref: String,
    pub payment_date: String,
    pub created_date: String,
    pub modified_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOption {
    pub id: i64,
    pub product_id: i64,
    pub code: String,
    pub barcode: String,
    pub product_name: String,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub size: String,
    pub retail_price: f64,
    pub status: String,
    pub created_date: String,
    pub modified_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stock {
    pub product_id: i64,
    pub product_option_id: i64,
    pub modified_date: String,
    pub style_code: String,
    pub code: String,
    pub barcode: String,
    pub branch_id: i64,
    pub size: String,
    pub available: f64,
    pub stock_on_hand: f64,
    pub open_sales: f64,
    pub incoming: f64,
    #[serde(rename = "virtual")]
    pub virtual_stock: f64,
    pub holding: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upsert_ack_tolerates_missing_fields() {
        let ack: UpsertAck = serde_json::from_value(json!({
            "index": 0,
            "success": false,
            "errors": ["Member not found"]
        }))
        .unwrap();
        assert!(!ack.success);
        assert_eq!(ack.errors, vec!["Member not found"]);
        assert_eq!(ack.id, 0);
    }

    #[test]
    fn sales_order_parses_a_sparse_payload() {
        let order: SalesOrder = serde_json::from_value(json!({
            "id": 42,
            "reference": "SO-1001",
            "internalComments": "#FL#returnId: 9#FL#",
            "lineItems": [{ "code": "SKU-1", "qty": 2.0, "unitPrice": 10.5, "discount": 0.0 }]
        }))
        .unwrap();
        assert_eq!(order.id, 42);
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.line_items[0].code.as_deref(), Some("SKU-1"));
        assert!(order.delivery_city.is_empty());
    }
}
