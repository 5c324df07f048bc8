//! Unified error types for the domain layer
//!
//! The rules engine is fail-open for malformed free text (status effects are
//! skipped, never rejected), so these errors only cover precondition
//! violations and invalid edits that a caller has to see.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

/// A weapon refused to fire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FireError {
    /// Weapon tracks ammo and has none left
    #[error("{weapon} is out of ammo")]
    OutOfAmmo { weapon: String },

    /// No weapon in the loadout at this position
    #[error("No weapon at slot {index}")]
    NoWeapon { index: usize },
}

/// A skill rank edit was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankEditError {
    /// Skill id is not part of the catalog
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// Raising the rank would spend more points than remain
    #[error("Not enough skill points: need {needed}, have {remaining}")]
    InsufficientPoints { needed: u32, remaining: u32 },
}

/// Text that names none of the four attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown attribute: {0}")]
pub struct UnknownAttribute(pub String);
