#![deny(missing_docs)]

//! Two-arm allocation engine: eligibility gate, permuted-block and
//! minimization allocators, and the participant registry they operate on.

/// Allocator trait and the factory selecting an implementation.
pub mod allocator;
/// In-memory audit trail.
pub mod audit;
/// Permuted-block allocation.
pub mod block;
/// YAML configuration schema and validation.
pub mod config;
/// Inclusion and exclusion checks.
pub mod eligibility;
/// Enrolled roster exports (CSV and JSON snapshots).
pub mod export;
/// Minimization allocation.
pub mod minimization;
/// Participant records and lifecycle transitions.
pub mod registry;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Orchestration of gate, allocator and registry.
pub mod service;

pub use allocator::{allocator_for, ArmAllocator};
pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use block::BlockAllocator;
pub use config::{AllocationConfig, AllocationStrategy};
pub use eligibility::{Admission, EligibilityAnswers, EligibilityGate, RejectionReason};
pub use export::{
    enrolled_roster, export_roster_csv, snapshot_to_json, write_roster_csv, RosterRecord,
    RosterSnapshot,
};
pub use minimization::MinimizationAllocator;
pub use registry::ParticipantRegistry;
pub use service::{AllocationService, EnrollmentSummary};
