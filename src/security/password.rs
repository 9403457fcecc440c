//! Password hashing.

use std::fmt::Debug;

use thiserror::Error;

/// bcrypt work factor for every deployed encoder.
pub const DEFAULT_COST: u32 = 12;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("bcrypt cost must be within {min}..={max}, got {0}", min = MIN_COST, max = MAX_COST)]
    Cost(u32),
}

/// One-way password hashing.
pub trait PasswordEncoder: Send + Sync + Debug {
    /// Hash `raw` with a fresh salt.
    fn encode(&self, raw: &str) -> Result<String, PasswordError>;

    /// Check `raw` against a stored hash. Malformed hashes never match.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

/// Salted adaptive hashing with a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BCryptPasswordEncoder {
    cost: u32,
}

impl BCryptPasswordEncoder {
    /// Encoder with an explicit work factor. Production wiring always uses
    /// `Default` (cost 12); lower costs exist for test suites.
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::Cost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BCryptPasswordEncoder {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordEncoder for BCryptPasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(raw, self.cost)?)
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        match bcrypt::verify(raw, encoded) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Encoded password does not look like bcrypt");
                false
            }
        }
    }
}
