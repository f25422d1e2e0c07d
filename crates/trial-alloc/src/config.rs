use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trial_core::{ErrorInfo, TrialError, DEFAULT_SEED};

use crate::serde::{from_yaml_str, to_canonical_json_bytes};

/// Smallest accepted target enrollment.
pub const MIN_TARGET_ENROLLMENT: usize = 2;
/// Largest accepted target enrollment.
pub const MAX_TARGET_ENROLLMENT: usize = 1000;
/// Largest accepted block size.
pub const MAX_BLOCK_SIZE: usize = MAX_TARGET_ENROLLMENT;

/// How the next arm is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationStrategy {
    /// Permuted blocks of equal arm counts.
    Block,
    /// Greedy balancing of live enrolled counts.
    Minimization,
}

impl AllocationStrategy {
    /// Stable label used in provenance records.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::Block => "block",
            AllocationStrategy::Minimization => "minimization",
        }
    }
}

/// YAML-configurable parameters for an allocation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Seed for the random source.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Allocation strategy. Configuration files must name it explicitly.
    #[serde(default)]
    pub strategy: Option<AllocationStrategy>,
    /// Block size used by the block strategy. Must be even.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Number of enrolled participants after which allocation stops.
    #[serde(default = "default_target_enrollment")]
    pub target_enrollment: usize,
    /// Whether the eligibility gate must admit a participant before allocation.
    #[serde(default = "default_eligibility_enabled")]
    pub eligibility_enabled: bool,
    /// Exclusion criteria that must be answered before the gate admits.
    #[serde(default)]
    pub exclusion_criteria: Vec<String>,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_block_size() -> usize {
    4
}

fn default_target_enrollment() -> usize {
    50
}

fn default_eligibility_enabled() -> bool {
    true
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self::with_strategy(AllocationStrategy::Block)
    }
}

impl AllocationConfig {
    /// Default configuration using the given strategy.
    pub fn with_strategy(strategy: AllocationStrategy) -> Self {
        Self {
            seed: default_seed(),
            strategy: Some(strategy),
            block_size: default_block_size(),
            target_enrollment: default_target_enrollment(),
            eligibility_enabled: default_eligibility_enabled(),
            exclusion_criteria: Vec::new(),
        }
    }

    /// Parses and validates a YAML configuration document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, TrialError> {
        let config: AllocationConfig = from_yaml_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks block size parity, the target range and the strategy.
    pub fn validate(&self) -> Result<AllocationStrategy, TrialError> {
        let strategy = self.strategy.ok_or_else(|| {
            TrialError::InvalidConfiguration(
                ErrorInfo::new("trial_alloc.config_strategy", "allocation strategy is unset")
                    .with_hint("set `strategy` to `block` or `minimization`"),
            )
        })?;
        if strategy == AllocationStrategy::Block {
            validate_block_size(self.block_size)?;
        }
        if !(MIN_TARGET_ENROLLMENT..=MAX_TARGET_ENROLLMENT).contains(&self.target_enrollment) {
            return Err(TrialError::InvalidConfiguration(
                ErrorInfo::new(
                    "trial_alloc.config_target",
                    "target enrollment outside the accepted range",
                )
                .with_context("target_enrollment", self.target_enrollment.to_string())
                .with_context("min", MIN_TARGET_ENROLLMENT.to_string())
                .with_context("max", MAX_TARGET_ENROLLMENT.to_string()),
            ));
        }
        Ok(strategy)
    }

    /// Hex SHA-256 digest of the canonical JSON form of this configuration.
    pub fn digest(&self) -> Result<String, TrialError> {
        let bytes = to_canonical_json_bytes(self)?;
        Ok(hex::encode(Sha256::digest(bytes)))
    }
}

/// Rejects zero, odd and oversized block sizes.
pub fn validate_block_size(block_size: usize) -> Result<(), TrialError> {
    if block_size == 0 || block_size % 2 != 0 || block_size > MAX_BLOCK_SIZE {
        return Err(TrialError::InvalidConfiguration(
            ErrorInfo::new(
                "trial_alloc.config_block_size",
                "block size must be a positive even number no larger than the maximum",
            )
            .with_context("block_size", block_size.to_string())
            .with_context("max", MAX_BLOCK_SIZE.to_string()),
        ));
    }
    Ok(())
}
