use std::time::Duration;

// ============================================================================
// Engine Configuration
// ============================================================================

/// Timeouts applied to repository and audit IO so a transition call can
/// never block indefinitely on storage.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Budget for each repository read or compare-and-swap write.
    pub persist_timeout: Duration,
    /// Budget for the best-effort audit append.
    pub audit_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            persist_timeout: Duration::from_secs(5),
            audit_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Hard cap on ids per batch call; larger requests are rejected whole.
    pub max_batch_size: usize,
    /// Items processed at once. Values below 1 are treated as 1.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            concurrency: 4,
        }
    }
}

impl BatchConfig {
    /// Strictly one item at a time, in input order.
    pub fn sequential() -> Self {
        Self {
            concurrency: 1,
            ..Self::default()
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
