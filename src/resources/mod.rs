//! Business sub-clients
//!
//! One module per vendor object. Simple CRUD and queries ride the REST
//! channel; operations the API does not expose delegate to the UI
//! workflows. Query predicates are vendor filter-expression strings and
//! pass through verbatim.

use crate::error::{ApiError, Cin7Error, Result};
use crate::resources::types::UpsertAck;

pub mod credit_notes;
pub mod payments;
pub mod product_options;
pub mod sales_orders;
pub mod stock_levels;
pub mod types;

pub use credit_notes::CreditNotes;
pub use payments::Payments;
pub use product_options::ProductOptions;
pub use sales_orders::SalesOrders;
pub use stock_levels::StockLevels;

/// References may contain '#', which would otherwise terminate the URL
pub(crate) fn encode_ref(reference: &str) -> String {
    reference.replace('#', "%23")
}

/// Resolve a single-record upsert: the new id on success, the vendor's
/// joined error messages otherwise
pub(crate) fn single_ack_id(acks: Vec<UpsertAck>) -> Result<String> {
    let all_ok = acks.iter().all(|ack| ack.success);
    let first = acks
        .into_iter()
        .next()
        .ok_or_else(|| Cin7Error::Other("empty upsert response".into()))?;
    if !all_ok {
        return Err(Cin7Error::Api(ApiError::UpsertRejected {
            errors: first.errors,
        }));
    }
    Ok(first.id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_marks_are_escaped() {
        assert_eq!(encode_ref("#1001"), "%231001");
        assert_eq!(encode_ref("SO-1001"), "SO-1001");
    }

    #[test]
    fn single_ack_returns_the_new_id() {
        let acks = vec![UpsertAck {
            success: true,
            id: 77,
            ..Default::default()
        }];
        assert_eq!(single_ack_id(acks).unwrap(), "77");
    }

    #[test]
    fn rejected_upsert_surfaces_the_vendor_errors() {
        let acks = vec![
            UpsertAck {
                success: false,
                errors: vec!["Branch not found".into(), "Stage invalid".into()],
                ..Default::default()
            },
            UpsertAck {
                success: true,
                id: 2,
                ..Default::default()
            },
        ];
        let err = single_ack_id(acks).unwrap_err();
        assert!(err.to_string().contains("Branch not found"));
        assert!(err.to_string().contains("Stage invalid"));
    }
}
