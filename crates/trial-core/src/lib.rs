#![deny(missing_docs)]
#![doc = "Core vocabulary for the two-arm trial allocation engine: arms, participant records, structured errors and the seeded random source."]

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, TrialError};
pub use provenance::{AllocationProvenance, SchemaVersion};
pub use rng::{RandomSource, DEFAULT_SEED};
pub use types::{Arm, Participant, ParticipantId, ParticipantStatus};
