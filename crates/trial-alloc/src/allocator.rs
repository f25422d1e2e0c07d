use std::fmt;

use trial_core::{Arm, RandomSource, TrialError};

use crate::block::BlockAllocator;
use crate::config::{AllocationConfig, AllocationStrategy};
use crate::minimization::MinimizationAllocator;
use crate::registry::ParticipantRegistry;

/// Chooses the arm for the next admitted participant.
pub trait ArmAllocator: fmt::Debug + Send + Sync {
    /// Strategy implemented by this allocator.
    fn strategy(&self) -> AllocationStrategy;

    /// Produces the next assignment. The registry is read, never mutated.
    fn next_assignment(&mut self, registry: &ParticipantRegistry, rng: &mut RandomSource) -> Arm;
}

impl ArmAllocator for BlockAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Block
    }

    fn next_assignment(&mut self, _registry: &ParticipantRegistry, rng: &mut RandomSource) -> Arm {
        BlockAllocator::next_assignment(self, rng)
    }
}

impl ArmAllocator for MinimizationAllocator {
    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::Minimization
    }

    fn next_assignment(&mut self, registry: &ParticipantRegistry, rng: &mut RandomSource) -> Arm {
        MinimizationAllocator::next_assignment(self, registry, rng)
    }
}

/// Builds the allocator named by a validated configuration.
pub fn allocator_for(config: &AllocationConfig) -> Result<Box<dyn ArmAllocator>, TrialError> {
    let allocator: Box<dyn ArmAllocator> = match config.validate()? {
        AllocationStrategy::Block => Box::new(BlockAllocator::new(config.block_size)?),
        AllocationStrategy::Minimization => Box::new(MinimizationAllocator::new()),
    };
    Ok(allocator)
}
