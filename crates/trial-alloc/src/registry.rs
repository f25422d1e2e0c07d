use std::collections::BTreeMap;

use chrono::Utc;
use trial_core::{Arm, ErrorInfo, Participant, ParticipantId, ParticipantStatus, TrialError};

/// Owns every participant record and its lifecycle status.
///
/// Records are keyed by id, so iteration follows issuance order. New records
/// are only created through [`crate::AllocationService`].
#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    participants: BTreeMap<ParticipantId, Participant>,
    last_issued: u64,
}

fn missing(id: ParticipantId, expected: &str) -> TrialError {
    TrialError::NotFound(
        ErrorInfo::new(
            "trial_alloc.registry_missing",
            format!("no {expected} participant {id}"),
        )
        .with_context("participant", id.to_string()),
    )
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next id and stores a new enrolled record.
    pub(crate) fn enroll(&mut self, arm: Arm) -> Participant {
        self.last_issued += 1;
        let participant = Participant {
            id: ParticipantId::from_raw(self.last_issued),
            arm,
            created_at: Utc::now(),
            note: String::new(),
            status: ParticipantStatus::Enrolled,
        };
        self.participants.insert(participant.id, participant.clone());
        participant
    }

    /// Marks an enrolled participant as withdrawn.
    pub fn withdraw(&mut self, id: ParticipantId) -> Result<(), TrialError> {
        match self.participants.get_mut(&id) {
            Some(participant) if participant.status == ParticipantStatus::Enrolled => {
                participant.status = ParticipantStatus::Withdrawn;
                Ok(())
            }
            _ => Err(missing(id, "enrolled")),
        }
    }

    /// Returns a withdrawn participant to enrolled status.
    pub fn reinstate(&mut self, id: ParticipantId) -> Result<(), TrialError> {
        match self.participants.get_mut(&id) {
            Some(participant) if participant.status == ParticipantStatus::Withdrawn => {
                participant.status = ParticipantStatus::Enrolled;
                Ok(())
            }
            _ => Err(missing(id, "withdrawn")),
        }
    }

    /// Deletes a record in any status. The id is never issued again.
    pub fn remove(&mut self, id: ParticipantId) -> Result<Participant, TrialError> {
        self.participants
            .remove(&id)
            .ok_or_else(|| missing(id, "registered"))
    }

    /// Overwrites the note attached to a participant.
    pub fn set_note(&mut self, id: ParticipantId, text: impl Into<String>) -> Result<(), TrialError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or_else(|| missing(id, "registered"))?;
        participant.note = text.into();
        Ok(())
    }

    /// Looks up a single record.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// All records in issuance order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.values()
    }

    /// Enrolled records in issuance order.
    pub fn enrolled(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants().filter(|p| p.is_enrolled())
    }

    /// Number of records of any status.
    pub fn total(&self) -> usize {
        self.participants.len()
    }

    /// Number of records currently enrolled.
    pub fn enrolled_count(&self) -> usize {
        self.total() - self.withdrawn_count()
    }

    /// Number of records currently withdrawn.
    pub fn withdrawn_count(&self) -> usize {
        self.participants
            .values()
            .filter(|p| p.status == ParticipantStatus::Withdrawn)
            .count()
    }

    /// Number of records assigned to `arm`, optionally only enrolled ones.
    pub fn count_by_arm(&self, arm: Arm, only_enrolled: bool) -> usize {
        self.participants
            .values()
            .filter(|p| p.arm == arm && (!only_enrolled || p.is_enrolled()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(arms: &[Arm]) -> (ParticipantRegistry, Vec<ParticipantId>) {
        let mut registry = ParticipantRegistry::new();
        let ids = arms.iter().map(|arm| registry.enroll(*arm).id).collect();
        (registry, ids)
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA, Arm::ArmB, Arm::ArmA]);
        assert_eq!(
            ids.iter().map(ParticipantId::as_raw).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        registry.remove(ids[2]).unwrap();
        assert_eq!(registry.enroll(Arm::ArmB).id.as_raw(), 4);
    }

    #[test]
    fn new_records_start_enrolled_with_empty_note() {
        let mut registry = ParticipantRegistry::new();
        let participant = registry.enroll(Arm::ArmA);
        assert_eq!(participant.status, ParticipantStatus::Enrolled);
        assert!(participant.note.is_empty());
        assert_eq!(registry.get(participant.id), Some(&participant));
    }

    #[test]
    fn withdraw_twice_is_rejected_without_change() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA, Arm::ArmB]);
        registry.withdraw(ids[0]).unwrap();
        let before = registry.clone();
        let err = registry.withdraw(ids[0]).unwrap_err();
        assert!(matches!(err, TrialError::NotFound(_)));
        assert_eq!(registry.withdrawn_count(), before.withdrawn_count());
        assert_eq!(registry.enrolled_count(), 1);
    }

    #[test]
    fn withdraw_absent_id_is_rejected() {
        let (mut registry, _) = registry_with(&[Arm::ArmA]);
        let err = registry.withdraw(ParticipantId::from_raw(9)).unwrap_err();
        assert_eq!(err.info().context["participant"], "P009");
        assert_eq!(registry.enrolled_count(), 1);
    }

    #[test]
    fn reinstate_requires_withdrawn() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA]);
        assert!(registry.reinstate(ids[0]).is_err());
        registry.withdraw(ids[0]).unwrap();
        registry.reinstate(ids[0]).unwrap();
        assert_eq!(registry.enrolled_count(), 1);
        assert_eq!(registry.withdrawn_count(), 0);
    }

    #[test]
    fn removing_withdrawn_record_clears_marking() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA, Arm::ArmB]);
        registry.withdraw(ids[1]).unwrap();
        let removed = registry.remove(ids[1]).unwrap();
        assert_eq!(removed.status, ParticipantStatus::Withdrawn);
        assert_eq!(registry.withdrawn_count(), 0);
        assert_eq!(registry.total(), 1);
        assert!(registry.get(ids[1]).is_none());
        assert!(registry.remove(ids[1]).is_err());
    }

    #[test]
    fn enroll_then_remove_restores_count() {
        let (mut registry, _) = registry_with(&[Arm::ArmA, Arm::ArmB]);
        let before = registry.enrolled_count();
        let id = registry.enroll(Arm::ArmA).id;
        registry.remove(id).unwrap();
        assert_eq!(registry.enrolled_count(), before);
        assert!(registry.participants().all(|p| p.id != id));
    }

    #[test]
    fn set_note_overwrites() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA]);
        registry.set_note(ids[0], "first visit").unwrap();
        registry.set_note(ids[0], "moved to site B").unwrap();
        assert_eq!(registry.get(ids[0]).unwrap().note, "moved to site B");
        assert!(registry
            .set_note(ParticipantId::from_raw(2), "nobody")
            .is_err());
    }

    #[test]
    fn arm_counts_respect_status_filter() {
        let (mut registry, ids) = registry_with(&[Arm::ArmA, Arm::ArmA, Arm::ArmB]);
        registry.withdraw(ids[0]).unwrap();
        assert_eq!(registry.count_by_arm(Arm::ArmA, false), 2);
        assert_eq!(registry.count_by_arm(Arm::ArmA, true), 1);
        assert_eq!(registry.count_by_arm(Arm::ArmB, true), 1);
        assert_eq!(
            registry.enrolled_count(),
            registry.total() - registry.withdrawn_count()
        );
    }
}
