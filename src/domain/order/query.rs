use std::sync::Arc;

use uuid::Uuid;

use crate::store::OrderRepository;

use super::errors::TransitionError;
use super::rules::BusinessRuleGate;
use super::value_objects::{OrderSnapshot, OrderStatus};

// ============================================================================
// Transition Query - Read Side
// ============================================================================
//
// Answers "where can this order go right now" without changing anything.
// A target counts only if the graph has the edge AND the rule gate passes
// it against the current snapshot, so the answer matches what `update`
// would actually accept.
//
// ============================================================================

pub struct TransitionQuery {
    repository: Arc<dyn OrderRepository>,
    gate: BusinessRuleGate,
}

impl TransitionQuery {
    pub fn new(repository: Arc<dyn OrderRepository>, gate: BusinessRuleGate) -> Self {
        Self { repository, gate }
    }

    /// Statuses the order can currently move to, graph edges filtered
    /// through the business rules.
    pub async fn available_targets(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderStatus>, TransitionError> {
        let order = self.load(order_id).await?;

        let mut targets = Vec::new();
        for &target in order.status.allowed_targets() {
            match self.gate.check(&order, target) {
                Ok(()) => targets.push(target),
                Err(violation) => {
                    tracing::debug!(
                        order_id = %order.id,
                        rule = violation.rule,
                        target = %target,
                        "Target filtered out by business rule"
                    );
                }
            }
        }

        Ok(targets)
    }

    /// Whether `update` would currently accept this exact transition.
    ///
    /// A target equal to the current status reports `false`: it is not a
    /// transition, even though `update` answers it with a no-op success.
    pub async fn can_apply(
        &self,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<bool, TransitionError> {
        let order = self.load(order_id).await?;
        Ok(order.status.can_transition_to(target) && self.gate.check(&order, target).is_ok())
    }

    async fn load(&self, order_id: Uuid) -> Result<OrderSnapshot, TransitionError> {
        self.repository
            .get(order_id)
            .await
            .map_err(TransitionError::Persistence)?
            .ok_or(TransitionError::OrderNotFound(order_id))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
