use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Transition Records & Results
// ============================================================================

/// One audited status change. Records are append-only facts; nothing in the
/// crate updates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub order_id: Uuid,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub operator: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a single transition request.
///
/// A request whose target equals the current status succeeds as `NoOp`
/// without touching storage; callers that care can tell the two apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied {
        from: OrderStatus,
        to: OrderStatus,
        new_version: i64,
    },
    NoOp {
        status: OrderStatus,
    },
}

impl TransitionOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, TransitionOutcome::NoOp { .. })
    }
}

/// One order a batch could not transition.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub order_id: Uuid,
    pub code: &'static str,
    pub reason: String,
}

/// Aggregated outcome of a batch run.
///
/// Every input id lands in exactly one of `success_ids` or `failures`, so
/// `success_count() + failure_count() == total_count` always holds, in
/// input order on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total_count: usize,
    pub success_ids: Vec<Uuid>,
    pub failures: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn success_count(&self) -> usize {
        self.success_ids.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_noop_flag() {
        let applied = TransitionOutcome::Applied {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
            new_version: 2,
        };
        let noop = TransitionOutcome::NoOp { status: OrderStatus::Pending };

        assert!(!applied.is_noop());
        assert!(noop.is_noop());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = TransitionOutcome::Applied {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
            new_version: 2,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""outcome":"applied""#));
        assert!(json.contains(r#""from":"pending""#));
    }

    #[test]
    fn test_transition_record_round_trip() {
        let record = TransitionRecord {
            order_id: Uuid::new_v4(),
            from_status: OrderStatus::Confirmed,
            to_status: OrderStatus::Processing,
            operator: "warehouse".to_string(),
            note: Some("picked up".to_string()),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: TransitionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record.order_id, deserialized.order_id);
        assert_eq!(record.from_status, deserialized.from_status);
        assert_eq!(record.to_status, deserialized.to_status);
        assert_eq!(record.note, deserialized.note);
    }

    #[test]
    fn test_batch_result_counts() {
        let result = BatchResult {
            total_count: 3,
            success_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            failures: vec![BatchFailure {
                order_id: Uuid::new_v4(),
                code: "ORDER_NOT_FOUND",
                reason: "missing".to_string(),
            }],
        };

        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.success_count() + result.failure_count(), result.total_count);
    }
}
