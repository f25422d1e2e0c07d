//! Roster exports for enrolled participants.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use trial_core::{
    AllocationProvenance, Arm, ErrorInfo, ParticipantId, SchemaVersion, TrialError,
};

use crate::registry::ParticipantRegistry;
use crate::serde::to_canonical_json_bytes;

/// Timestamp layout used in CSV rosters.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row of CSV rosters.
pub const CSV_HEADER: [&str; 4] = ["ID", "Group", "Timestamp", "Note"];

/// One enrolled participant as handed to exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Assigned arm.
    pub arm: Arm,
    /// Allocation time formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Staff note.
    pub note: String,
}

/// Roster snapshot with the provenance needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Schema of this payload.
    pub schema_version: SchemaVersion,
    /// How the assignments were produced.
    pub provenance: AllocationProvenance,
    /// Enrolled participants in issuance order.
    pub records: Vec<RosterRecord>,
}

fn export_error(err: impl ToString) -> TrialError {
    TrialError::Serde(ErrorInfo::new("trial_alloc.export", err.to_string()))
}

/// Enrolled participants in issuance order, withdrawn ones left out.
pub fn enrolled_roster(registry: &ParticipantRegistry) -> Vec<RosterRecord> {
    registry
        .enrolled()
        .map(|participant| RosterRecord {
            id: participant.id,
            arm: participant.arm,
            timestamp: participant.created_at.format(TIMESTAMP_FORMAT).to_string(),
            note: participant.note.clone(),
        })
        .collect()
}

/// Writes roster records as CSV with a header row.
pub fn write_roster_csv<W: Write>(records: &[RosterRecord], writer: W) -> Result<(), TrialError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER).map_err(export_error)?;
    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.arm.label().to_string(),
            record.timestamp.clone(),
            record.note.clone(),
        ])
        .map_err(export_error)?;
    }
    wtr.flush().map_err(export_error)
}

/// Writes roster records as CSV to `out_path`.
pub fn export_roster_csv(records: &[RosterRecord], out_path: &Path) -> Result<(), TrialError> {
    let file = File::create(out_path).map_err(|err| {
        TrialError::Serde(
            ErrorInfo::new("trial_alloc.export", err.to_string())
                .with_context("path", out_path.display().to_string()),
        )
    })?;
    write_roster_csv(records, file)
}

/// Serializes a snapshot into canonical JSON bytes.
pub fn snapshot_to_json(snapshot: &RosterSnapshot) -> Result<Vec<u8>, TrialError> {
    to_canonical_json_bytes(snapshot)
}
