//! Arms, participant identifiers and participant records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two parallel treatment arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arm {
    /// The M+K intervention arm.
    ArmA,
    /// The standard-of-care arm.
    ArmB,
}

impl Arm {
    /// Both arms in canonical order.
    pub const ALL: [Arm; 2] = [Arm::ArmA, Arm::ArmB];

    /// Returns the opposite arm.
    pub fn other(self) -> Arm {
        match self {
            Arm::ArmA => Arm::ArmB,
            Arm::ArmB => Arm::ArmA,
        }
    }

    /// Display label used in rosters and exports.
    pub fn label(self) -> &'static str {
        match self {
            Arm::ArmA => "M+K group",
            Arm::ArmB => "SOC group",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier issued to a participant at allocation time.
///
/// Identifiers are issued from a monotonic counter starting at 1 and are never
/// reused, even after the participant is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(u64);

impl ParticipantId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:03}", self.0)
    }
}

/// Lifecycle status of a participant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantStatus {
    /// Counted toward enrollment and arm balance.
    Enrolled,
    /// Still on record but excluded from arm balance and exports.
    Withdrawn,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantStatus::Enrolled => f.write_str("Enrolled"),
            ParticipantStatus::Withdrawn => f.write_str("Withdrawn"),
        }
    }
}

/// A randomized participant as held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier issued at allocation time.
    pub id: ParticipantId,
    /// Arm the participant was assigned to.
    pub arm: Arm,
    /// Moment the allocation was made.
    pub created_at: DateTime<Utc>,
    /// Free text note maintained by study staff.
    pub note: String,
    /// Current lifecycle status.
    pub status: ParticipantStatus,
}

impl Participant {
    /// Returns `true` if the participant currently counts as enrolled.
    pub fn is_enrolled(&self) -> bool {
        self.status == ParticipantStatus::Enrolled
    }
}
