//! In-memory record of everything the service did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trial_core::{Arm, ParticipantId, ParticipantStatus};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum AuditAction {
    /// A participant was created and assigned an arm.
    Allocated {
        /// New participant.
        participant: ParticipantId,
        /// Assigned arm.
        arm: Arm,
    },
    /// An allocation request was refused; carries the error code.
    AllocationRefused {
        /// Error code returned to the caller.
        code: String,
    },
    /// A participant was withdrawn.
    Withdrawn {
        /// Affected participant.
        participant: ParticipantId,
    },
    /// A withdrawal was undone.
    Reinstated {
        /// Affected participant.
        participant: ParticipantId,
    },
    /// A record was deleted.
    Removed {
        /// Deleted participant.
        participant: ParticipantId,
        /// Status the record had when it was deleted.
        status: ParticipantStatus,
    },
    /// A note was overwritten.
    NoteUpdated {
        /// Affected participant.
        participant: ParticipantId,
    },
    /// The random source was reset.
    Reseeded {
        /// New seed.
        seed: u64,
    },
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the trail, starting at 1.
    pub sequence: u64,
    /// Moment the action was recorded.
    pub at: DateTime<Utc>,
    /// Recorded action.
    #[serde(flatten)]
    pub action: AuditAction,
}

/// Append-only audit trail held in memory.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Appends an action and returns its sequence number.
    pub fn record(&mut self, action: AuditAction) -> u64 {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(AuditEntry {
            sequence,
            at: Utc::now(),
            action,
        });
        sequence
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
