use std::collections::VecDeque;

use tracing::debug;
use trial_core::{Arm, RandomSource, TrialError};

use crate::config::validate_block_size;

/// Permuted-block allocator.
///
/// Holds the pending assignments of the current block. When the queue is
/// empty the next call generates a block with `block_size / 2` of each arm,
/// shuffles it and pops from the front.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    block_size: usize,
    queue: VecDeque<Arm>,
    blocks_generated: u64,
}

impl BlockAllocator {
    /// Creates an allocator with an empty queue. Odd or zero sizes are rejected.
    pub fn new(block_size: usize) -> Result<Self, TrialError> {
        validate_block_size(block_size)?;
        Ok(Self {
            block_size,
            queue: VecDeque::new(),
            blocks_generated: 0,
        })
    }

    /// Number of blocks generated so far.
    pub fn blocks_generated(&self) -> u64 {
        self.blocks_generated
    }

    /// Assignments still pending in the current block.
    pub fn pending(&self) -> impl Iterator<Item = Arm> + '_ {
        self.queue.iter().copied()
    }

    /// Pops the next assignment, generating a new block first if needed.
    pub fn next_assignment(&mut self, rng: &mut RandomSource) -> Arm {
        loop {
            if let Some(arm) = self.queue.pop_front() {
                return arm;
            }
            self.generate(rng);
        }
    }

    fn generate(&mut self, rng: &mut RandomSource) {
        let mut block: Vec<Arm> = Arm::ALL
            .iter()
            .flat_map(|arm| std::iter::repeat(*arm).take(self.block_size / 2))
            .collect();
        rng.shuffle(&mut block);
        self.blocks_generated += 1;
        debug!(
            block = self.blocks_generated,
            size = self.block_size,
            "generated allocation block"
        );
        self.queue.extend(block);
    }
}
