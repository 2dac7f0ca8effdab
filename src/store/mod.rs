// ============================================================================
// Storage Layer - Persistence Seams
// ============================================================================
//
// Traits the engine persists through, plus in-memory reference
// implementations. Domain logic lives in src/domain/; nothing here knows
// about transition rules.
//
// ============================================================================

mod audit;
mod memory;
mod repository;

pub use audit::{AuditSink, AuditTrail};
pub use memory::{InMemoryAuditSink, InMemoryOrderRepository};
pub use repository::OrderRepository;
