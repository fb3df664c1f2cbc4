//! Unified error types for the domain layer
//!
//! Provides a common error type for validation and lookup failures, plus the
//! placement error types the grid operations return instead of panicking.

use thiserror::Error;

use crate::grid::{GridTab, PlacementRejection};

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for invariant violations.
    ///
    /// Use this when a persisted record or a constructed value breaks a rule:
    /// - Required fields are empty
    /// - Values are outside allowed ranges (item level, tier)
    /// - Too many prefixes or suffixes on an idol
    ///
    /// # Example
    /// ```ignore
    /// if !(1..=100).contains(&item_level) {
    ///     return Err(DomainError::validation("Item level must be between 1 and 100"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for Rarity {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "Rare" => Ok(Self::Rare),
    ///             _ => Err(DomainError::parse(format!("Unknown rarity: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Why a place or move operation on an idol set did not happen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Inventory idol not found: {0}")]
    UnknownInventoryIdol(String),

    #[error("Placement not found: {0}")]
    UnknownPlacement(String),

    #[error("Placement rejected: {0}")]
    Rejected(#[from] PlacementRejection),

    #[error("No free position on {0}")]
    NoFreePosition(GridTab),
}
