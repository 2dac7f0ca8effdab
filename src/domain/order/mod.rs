// ============================================================================
// Order Domain - Status Lifecycle for Orders
// ============================================================================
//
// This module contains ALL order-specific code:
// - Value objects (OrderStatus, PaymentStatus, OrderType, OrderSnapshot)
// - Transition graph (the fixed edge table)
// - Business rules (TransitionRule trait, BusinessRuleGate)
// - Requests (TransitionRequest, BatchRequest)
// - Records & results (TransitionRecord, TransitionOutcome, BatchResult)
// - Errors (TransitionError, BatchError)
// - Transition service, batch engine and read-side query
//
// Persistence seams live in src/store/; nothing here talks to a database
// directly.
//
// ============================================================================

pub mod value_objects;
pub mod transitions;
pub mod rules;
pub mod commands;
pub mod records;
pub mod errors;
pub mod service;
pub mod batch;
pub mod query;

// Re-export for convenience
pub use value_objects::*;
pub use rules::*;
pub use commands::*;
pub use records::*;
pub use errors::*;
pub use service::*;
pub use batch::*;
pub use query::*;
