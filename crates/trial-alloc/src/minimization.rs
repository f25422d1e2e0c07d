use std::cmp::Ordering;

use tracing::debug;
use trial_core::{Arm, RandomSource};

use crate::registry::ParticipantRegistry;

/// Assigns the arm with fewer enrolled participants.
///
/// Withdrawn participants are left out of the comparison. Ties are broken
/// with one draw from the random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimizationAllocator;

impl MinimizationAllocator {
    /// Creates the allocator. It keeps no state of its own.
    pub fn new() -> Self {
        Self
    }

    /// Chooses the under-enrolled arm, or a random arm when balanced.
    pub fn next_assignment(&self, registry: &ParticipantRegistry, rng: &mut RandomSource) -> Arm {
        let count_a = registry.count_by_arm(Arm::ArmA, true);
        let count_b = registry.count_by_arm(Arm::ArmB, true);
        match count_a.cmp(&count_b) {
            Ordering::Greater => Arm::ArmB,
            Ordering::Less => Arm::ArmA,
            Ordering::Equal => {
                let arm = rng.choice_of(Arm::ArmA, Arm::ArmB);
                debug!(count_a, count_b, arm = %arm, "minimization tie broken");
                arm
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(arms: &[Arm]) -> ParticipantRegistry {
        let mut registry = ParticipantRegistry::new();
        for arm in arms {
            registry.enroll(*arm);
        }
        registry
    }

    #[test]
    fn heavier_arm_a_yields_arm_b() {
        let registry = registry_with(&[Arm::ArmA, Arm::ArmB, Arm::ArmA]);
        for seed in 0..16 {
            let mut rng = RandomSource::from_seed(seed);
            assert_eq!(
                MinimizationAllocator::new().next_assignment(&registry, &mut rng),
                Arm::ArmB
            );
        }
    }

    #[test]
    fn heavier_arm_b_yields_arm_a() {
        let registry = registry_with(&[Arm::ArmB, Arm::ArmB]);
        let mut rng = RandomSource::default();
        assert_eq!(
            MinimizationAllocator::new().next_assignment(&registry, &mut rng),
            Arm::ArmA
        );
    }

    #[test]
    fn withdrawn_participants_do_not_count() {
        let mut registry = registry_with(&[Arm::ArmA, Arm::ArmA, Arm::ArmB]);
        let first = registry.participants().next().map(|p| p.id).unwrap();
        registry.withdraw(first).unwrap();
        registry.enroll(Arm::ArmB);
        // enrolled counts are now A:1, B:2
        let mut rng = RandomSource::default();
        assert_eq!(
            MinimizationAllocator::new().next_assignment(&registry, &mut rng),
            Arm::ArmA
        );
    }

    #[test]
    fn ties_follow_the_seed() {
        let registry = ParticipantRegistry::new();
        let mut a = RandomSource::from_seed(5);
        let mut b = RandomSource::from_seed(5);
        let allocator = MinimizationAllocator::new();
        for _ in 0..8 {
            assert_eq!(
                allocator.next_assignment(&registry, &mut a),
                allocator.next_assignment(&registry, &mut b)
            );
        }
    }
}
