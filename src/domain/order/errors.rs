use uuid::Uuid;

use crate::utils::IsTransient;

use super::rules::RuleViolation;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Transition Errors
// ============================================================================
//
// Every rejection carries a stable machine-readable code via `code()` so
// callers can branch without parsing display strings. The strings themselves
// are free to change; the codes are not.
//
// ============================================================================

/// Per-item failure code for orders a cancelled batch never reached.
pub const BATCH_CANCELLED: &str = "BATCH_CANCELLED";

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    RuleViolation(#[from] RuleViolation),

    #[error("Concurrency conflict on order {order_id}: version {expected_version} is stale")]
    ConcurrencyConflict { order_id: Uuid, expected_version: i64 },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}

impl TransitionError {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            TransitionError::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            TransitionError::RuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            TransitionError::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            TransitionError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl IsTransient for TransitionError {
    // Conflicts and storage hiccups may clear on a re-read; domain
    // rejections will not.
    fn is_transient(&self) -> bool {
        matches!(
            self,
            TransitionError::ConcurrencyConflict { .. } | TransitionError::Persistence(_)
        )
    }
}

/// Whole-batch rejections. Per-item failures never surface here; they are
/// collected into the batch result instead.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Batch contains no order ids")]
    EmptyBatch,

    #[error("Batch size {actual} exceeds the limit of {limit}")]
    SizeExceeded { actual: usize, limit: usize },
}

impl BatchError {
    pub fn code(&self) -> &'static str {
        match self {
            BatchError::EmptyBatch => "EMPTY_BATCH",
            BatchError::SizeExceeded { .. } => "BATCH_SIZE_EXCEEDED",
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
