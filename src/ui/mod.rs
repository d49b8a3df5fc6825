//! UI workflow engine
//!
//! Procedures that drive the console page through the operations the REST
//! API does not expose. Every workflow follows the same batch policy:
//!
//! 1. each item runs in its own fallible block;
//! 2. a failed item is recorded and the whole browser session is closed
//!    and relaunched before the next item, because the failure leaves the
//!    page in an unknown state;
//! 3. results are re-sorted into the caller's input order, whatever
//!    partitioning happened internally;
//! 4. the session is always closed once the batch finishes.
//!
//! Workflow code never constructs a browser; it asks the session manager
//! for the page and requests teardown, nothing else.

pub mod date_fix;
pub mod selectors;
pub mod stock_receipt;
pub mod void_flow;

/// Outcome of one batch item, produced exactly once per input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub id: String,
    pub success: bool,
    pub error: String,
}

impl BatchOutcome {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: String::new(),
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: error.into(),
        }
    }
}

/// Re-sort outcomes into the order the caller supplied the items in
pub(crate) fn sort_to_input_order(
    mut outcomes: Vec<BatchOutcome>,
    input_ids: &[String],
) -> Vec<BatchOutcome> {
    outcomes.sort_by_key(|outcome| {
        input_ids
            .iter()
            .position(|id| *id == outcome.id)
            .unwrap_or(usize::MAX)
    });
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_return_to_input_order_after_partitioning() {
        let input: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        // executed as two sub-batches in a different order
        let executed = vec![
            BatchOutcome::ok("b"),
            BatchOutcome::ok("d"),
            BatchOutcome::failed("a", "boom"),
            BatchOutcome::ok("c"),
        ];

        let sorted = sort_to_input_order(executed, &input);
        let ids: Vec<&str> = sorted.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(sorted.len(), input.len());
        assert!(!sorted[0].success);
    }
}
