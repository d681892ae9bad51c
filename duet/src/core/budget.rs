//! Step budget shared by both runners.

use thiserror::Error;

use crate::core::machine::ArithmeticError;

/// Reasons a run stops without producing a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: u64 },
}

/// Counts effective steps against a fixed limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBudget {
    limit: u64,
    used: u64,
}

impl StepBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserve one step, failing once the limit is spent.
    pub fn charge(&mut self) -> Result<(), RunError> {
        if self.used >= self.limit {
            return Err(RunError::StepLimit { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}
