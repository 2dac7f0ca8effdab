use super::value_objects::{OrderSnapshot, OrderStatus, OrderType, PaymentStatus};

// ============================================================================
// Business Rule Gate
// ============================================================================
//
// Conditional checks that sit on top of the transition graph: the graph says
// which edges exist, the gate says whether this particular order may take
// one right now. Rules are evaluated in registration order and the first
// violation short-circuits the rest.
//
// New constraints are added by implementing TransitionRule and appending it
// with `with_rule`; nothing in the engine needs to change.
//
// ============================================================================

/// A single rejected transition, carrying the rule that rejected it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rule '{rule}' rejected transition to {target}: {reason}")]
pub struct RuleViolation {
    pub rule: &'static str,
    pub target: OrderStatus,
    pub reason: String,
}

/// One conditional constraint on a proposed transition.
///
/// `check` receives the current snapshot and the proposed target; returning
/// `Err` blocks the transition. Rules must not mutate anything.
pub trait TransitionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, order: &OrderSnapshot, target: OrderStatus) -> Result<(), RuleViolation>;
}

// ============================================================================
// Stock Rules
// ============================================================================

/// Sales orders may not be shipped until they are fully paid.
pub struct PaymentRequiredForShipping;

impl TransitionRule for PaymentRequiredForShipping {
    fn name(&self) -> &'static str {
        "payment_required_for_shipping"
    }

    fn check(&self, order: &OrderSnapshot, target: OrderStatus) -> Result<(), RuleViolation> {
        if order.order_type == OrderType::Sales
            && target == OrderStatus::Shipped
            && order.payment_status != PaymentStatus::Paid
        {
            return Err(RuleViolation {
                rule: self.name(),
                target,
                reason: format!(
                    "sales order payment status is {}, full payment is required before shipping",
                    order.payment_status
                ),
            });
        }
        Ok(())
    }
}

/// Rental orders may not leave `Pending` until a rental start date is set.
pub struct RentalStartDateRequired;

impl TransitionRule for RentalStartDateRequired {
    fn name(&self) -> &'static str {
        "rental_start_date_required"
    }

    fn check(&self, order: &OrderSnapshot, target: OrderStatus) -> Result<(), RuleViolation> {
        if order.order_type == OrderType::Rental
            && order.status == OrderStatus::Pending
            && order.rental_start_date.is_none()
        {
            return Err(RuleViolation {
                rule: self.name(),
                target,
                reason: "rental order has no rental start date".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Gate
// ============================================================================

pub struct BusinessRuleGate {
    rules: Vec<Box<dyn TransitionRule>>,
}

impl BusinessRuleGate {
    /// Gate with no rules; every graph-valid transition passes.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Gate with the stock rule set.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(PaymentRequiredForShipping)
            .with_rule(RentalStartDateRequired)
    }

    /// Append a rule; rules run in the order they were added.
    pub fn with_rule(mut self, rule: impl TransitionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Run every rule against the proposed transition, stopping at the first
    /// violation.
    pub fn check(&self, order: &OrderSnapshot, target: OrderStatus) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            rule.check(order, target)?;
        }
        Ok(())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl Default for BusinessRuleGate {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
