// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains domain-specific business logic. Each domain has its
// own subdirectory with:
// - Value objects
// - Transition rules and graph
// - Requests and records
// - Errors
// - Services operating on the domain
//
// This layer is completely separate from the storage infrastructure.
//
// ============================================================================

pub mod order;
