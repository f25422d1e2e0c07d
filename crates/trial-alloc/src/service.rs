use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trial_core::{
    AllocationProvenance, Arm, ErrorInfo, Participant, ParticipantId, RandomSource,
    SchemaVersion, TrialError,
};

use crate::allocator::{allocator_for, ArmAllocator};
use crate::audit::{AuditAction, AuditLog};
use crate::config::{AllocationConfig, AllocationStrategy};
use crate::eligibility::{Admission, EligibilityAnswers, EligibilityGate};
use crate::export::{enrolled_roster, RosterRecord, RosterSnapshot};
use crate::registry::ParticipantRegistry;

/// Counts shown next to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentSummary {
    /// Participants currently enrolled.
    pub enrolled: usize,
    /// Participants currently withdrawn.
    pub withdrawn: usize,
    /// Records of any status.
    pub total: usize,
    /// Configured target enrollment.
    pub target: usize,
    /// Slots left before the target is reached.
    pub remaining: usize,
    /// Enrolled participants in the M+K arm.
    pub enrolled_arm_a: usize,
    /// Enrolled participants in the SOC arm.
    pub enrolled_arm_b: usize,
}

/// Couples the eligibility gate, the configured allocator and the registry.
///
/// This is the only way to create participants. Every mutator takes
/// `&mut self`, so callers sharing a service across threads must hold it
/// behind a single lock.
#[derive(Debug)]
pub struct AllocationService {
    config: AllocationConfig,
    rng: RandomSource,
    gate: Option<EligibilityGate>,
    allocator: Box<dyn ArmAllocator>,
    registry: ParticipantRegistry,
    audit: AuditLog,
}

impl AllocationService {
    /// Validates the configuration and builds an empty session.
    pub fn new(config: AllocationConfig) -> Result<Self, TrialError> {
        let allocator = allocator_for(&config)?;
        let gate = config
            .eligibility_enabled
            .then(|| EligibilityGate::new(config.exclusion_criteria.iter().cloned()));
        info!(
            strategy = allocator.strategy().as_str(),
            seed = config.seed,
            target = config.target_enrollment,
            "allocation service configured"
        );
        Ok(Self {
            rng: RandomSource::from_seed(config.seed),
            config,
            gate,
            allocator,
            registry: ParticipantRegistry::new(),
            audit: AuditLog::default(),
        })
    }

    /// Allocates the next participant.
    ///
    /// Fails with `NoSlotAvailable` when the target is met and with
    /// `NotEligible` when the gate is enabled and the answers are missing or
    /// rejected. Neither failure mutates the registry or consumes randomness.
    pub fn request_allocation(
        &mut self,
        answers: Option<&EligibilityAnswers>,
    ) -> Result<Participant, TrialError> {
        if let Err(err) = self.admit(answers) {
            warn!(code = err.code(), "allocation refused");
            self.audit.record(AuditAction::AllocationRefused {
                code: err.code().to_string(),
            });
            return Err(err);
        }
        let arm = self.allocator.next_assignment(&self.registry, &mut self.rng);
        let participant = self.registry.enroll(arm);
        info!(
            participant = %participant.id,
            arm = %arm,
            enrolled = self.registry.enrolled_count(),
            "participant allocated"
        );
        self.audit.record(AuditAction::Allocated {
            participant: participant.id,
            arm,
        });
        Ok(participant)
    }

    fn admit(&self, answers: Option<&EligibilityAnswers>) -> Result<(), TrialError> {
        let enrolled = self.registry.enrolled_count();
        if enrolled >= self.config.target_enrollment {
            return Err(TrialError::NoSlotAvailable(
                ErrorInfo::new("trial_alloc.target_reached", "target enrollment reached")
                    .with_context("enrolled", enrolled.to_string())
                    .with_context("target", self.config.target_enrollment.to_string()),
            ));
        }
        let Some(gate) = &self.gate else {
            return Ok(());
        };
        let Some(answers) = answers else {
            return Err(TrialError::NotEligible(
                ErrorInfo::new(
                    "trial_alloc.eligibility_missing",
                    "eligibility answers are required",
                )
                .with_hint("answer the inclusion and exclusion questions first"),
            ));
        };
        match gate.evaluate(answers) {
            Admission::Admit => Ok(()),
            Admission::Reject(reasons) => {
                let mut info = ErrorInfo::new(
                    "trial_alloc.eligibility_rejected",
                    "candidate does not meet the eligibility criteria",
                );
                for (idx, reason) in reasons.iter().enumerate() {
                    info = info.with_context(format!("reason_{idx}"), reason.to_string());
                }
                Err(TrialError::NotEligible(info))
            }
        }
    }

    /// Marks an enrolled participant as withdrawn.
    pub fn withdraw(&mut self, id: ParticipantId) -> Result<(), TrialError> {
        self.registry.withdraw(id)?;
        info!(participant = %id, "participant withdrawn");
        self.audit.record(AuditAction::Withdrawn { participant: id });
        Ok(())
    }

    /// Undoes a withdrawal.
    pub fn reinstate(&mut self, id: ParticipantId) -> Result<(), TrialError> {
        self.registry.reinstate(id)?;
        info!(participant = %id, "participant reinstated");
        self.audit.record(AuditAction::Reinstated { participant: id });
        Ok(())
    }

    /// Deletes a participant record in any status.
    pub fn remove(&mut self, id: ParticipantId) -> Result<Participant, TrialError> {
        let removed = self.registry.remove(id)?;
        info!(participant = %id, status = %removed.status, "participant removed");
        self.audit.record(AuditAction::Removed {
            participant: id,
            status: removed.status,
        });
        Ok(removed)
    }

    /// Overwrites a participant's note.
    pub fn set_note(&mut self, id: ParticipantId, text: impl Into<String>) -> Result<(), TrialError> {
        self.registry.set_note(id, text)?;
        self.audit.record(AuditAction::NoteUpdated { participant: id });
        Ok(())
    }

    /// Resets the random source. A partially used block keeps its pending
    /// assignments.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
        info!(seed, "random source reseeded");
        self.audit.record(AuditAction::Reseeded { seed });
    }

    /// Looks up one participant.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.registry.get(id)
    }

    /// Every record in issuance order, for display.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.registry.participants()
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// The in-memory audit trail.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Active allocation strategy.
    pub fn strategy(&self) -> AllocationStrategy {
        self.allocator.strategy()
    }

    /// Current enrollment counts.
    pub fn summary(&self) -> EnrollmentSummary {
        let enrolled = self.registry.enrolled_count();
        EnrollmentSummary {
            enrolled,
            withdrawn: self.registry.withdrawn_count(),
            total: self.registry.total(),
            target: self.config.target_enrollment,
            remaining: self.config.target_enrollment.saturating_sub(enrolled),
            enrolled_arm_a: self.registry.count_by_arm(Arm::ArmA, true),
            enrolled_arm_b: self.registry.count_by_arm(Arm::ArmB, true),
        }
    }

    /// Enrolled participants in issuance order.
    pub fn export_enrolled(&self) -> Vec<RosterRecord> {
        enrolled_roster(&self.registry)
    }

    /// Provenance describing this session.
    pub fn provenance(&self) -> Result<AllocationProvenance, TrialError> {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Ok(AllocationProvenance {
            config_hash: self.config.digest()?,
            seed: self.rng.current_seed(),
            strategy: self.strategy().as_str().to_string(),
            target_enrollment: self.config.target_enrollment,
            created_at: Utc::now().to_rfc3339(),
            tool_versions,
        })
    }

    /// Enrolled roster together with its provenance.
    pub fn snapshot(&self) -> Result<RosterSnapshot, TrialError> {
        Ok(RosterSnapshot {
            schema_version: SchemaVersion::default(),
            provenance: self.provenance()?,
            records: self.export_enrolled(),
        })
    }
}
