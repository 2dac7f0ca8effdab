use super::value_objects::OrderStatus;

// ============================================================================
// Order Transition Graph
// ============================================================================
//
// The directed graph of permitted status transitions, kept as a plain data
// table so the edge set can be inspected and tested without walking any
// control flow. Self-transitions are intentionally NOT edges: the service
// treats a request for the current status as an idempotent no-op before it
// ever consults this table.
//
// ============================================================================

/// Edge table: one row per status, listing the statuses it may move to.
static TRANSITION_TABLE: [(OrderStatus, &[OrderStatus]); 7] = [
    (OrderStatus::Pending, &[OrderStatus::Confirmed, OrderStatus::Cancelled]),
    (OrderStatus::Confirmed, &[OrderStatus::Processing, OrderStatus::Cancelled]),
    (OrderStatus::Processing, &[OrderStatus::Shipped]),
    (OrderStatus::Shipped, &[OrderStatus::Delivered]),
    (OrderStatus::Delivered, &[OrderStatus::Completed]),
    (OrderStatus::Completed, &[]),
    (OrderStatus::Cancelled, &[]),
];

impl OrderStatus {
    /// Statuses this status is allowed to move to.
    pub fn allowed_targets(self) -> &'static [OrderStatus] {
        TRANSITION_TABLE
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// Whether the graph contains an edge from `self` to `target`.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
