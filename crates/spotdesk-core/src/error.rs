//! Error types for spotdesk-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid order side: {0}")]
    InvalidSide(String),

    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),
}

/// A rejected order form.
///
/// Carries every violation found so the form can show them all at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn messages(&self) -> &[String] {
        &self.violations
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
