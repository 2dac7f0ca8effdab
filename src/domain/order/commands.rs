use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Transition Requests - Represent operator intent
// ============================================================================

/// Request to move a single order to `target_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub order_id: Uuid,
    pub target_status: OrderStatus,
    /// Who asked for the change; recorded in the audit trail.
    pub operator: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransitionRequest {
    pub fn new(order_id: Uuid, target_status: OrderStatus, operator: impl Into<String>) -> Self {
        Self {
            order_id,
            target_status,
            operator: operator.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Request to move many orders to the same `target_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub order_ids: Vec<Uuid>,
    pub target_status: OrderStatus,
    pub operator: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl BatchRequest {
    pub fn new(
        order_ids: Vec<Uuid>,
        target_status: OrderStatus,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            order_ids,
            target_status,
            operator: operator.into(),
            note: None,
        }
    }

    /// Per-item request for one id in this batch.
    pub fn item(&self, order_id: Uuid) -> TransitionRequest {
        TransitionRequest {
            order_id,
            target_status: self.target_status,
            operator: self.operator.clone(),
            note: self.note.clone(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
