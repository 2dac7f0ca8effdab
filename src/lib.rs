// ============================================================================
// Order Lifecycle Transition Engine
// ============================================================================
//
// Library for moving orders through their status lifecycle:
//
// - A fixed transition graph decides which status changes exist at all.
// - A business rule gate decides whether this order may take one now.
// - The transition service applies a single change with optimistic
//   concurrency control and appends an audit record.
// - The batch engine fans a change out over many orders with bounded
//   concurrency and per-item failure isolation.
// - The transition query reports where an order can currently go.
//
// Persistence is injected through the `store` traits; the crate ships
// in-memory implementations for tests and embedding without a database.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::{BatchConfig, ServiceConfig};
pub use domain::order::{
    BatchError, BatchFailure, BatchRequest, BatchResult, BatchTransitionEngine, BusinessRuleGate,
    OrderSnapshot, OrderStatus, OrderTransitionService, OrderType, PaymentStatus, RuleViolation,
    TransitionError, TransitionOutcome, TransitionQuery, TransitionRecord, TransitionRequest,
    TransitionRule, BATCH_CANCELLED,
};
pub use metrics::Metrics;
pub use store::{
    AuditSink, AuditTrail, InMemoryAuditSink, InMemoryOrderRepository, OrderRepository,
};
pub use utils::{retry_on_transient, IsTransient, RetryConfig, RetryResult};
