//! Step pattern error types

use thiserror::Error;

/// Errors from parsing a lane pattern string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern does not describe exactly one cycle
    #[error("Pattern must have {expected} steps, found {found}")]
    WrongLength { expected: usize, found: usize },

    /// Character that is neither an on nor an off marker
    #[error("Invalid step character {character:?} at step {step}")]
    InvalidStep { character: char, step: usize },
}

/// Result type for pattern operations
pub type PatternResult<T> = Result<T, PatternError>;
