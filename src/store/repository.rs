use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::order::{OrderSnapshot, OrderStatus};

// ============================================================================
// Order Repository - Persistence Seam
// ============================================================================
//
// The engine owns no storage. Embedding services implement this trait over
// their database; the in-memory implementation in `memory.rs` backs the
// crate's own tests.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch the current snapshot, `None` when the order does not exist.
    async fn get(&self, order_id: Uuid) -> Result<Option<OrderSnapshot>>;

    /// Atomically write `new_status` if the stored version still equals
    /// `expected_version`.
    ///
    /// Returns `Ok(true)` when the swap was applied and `Ok(false)` on a
    /// version mismatch (someone else changed the order since it was read).
    /// `Err` is reserved for storage failures.
    async fn compare_and_swap_status(
        &self,
        order_id: Uuid,
        expected_version: i64,
        new_status: OrderStatus,
        new_version: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
}
