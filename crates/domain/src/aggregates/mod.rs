//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate owns its parts and exposes behavior through methods, not
//! public fields. Time is always passed in by the caller.

pub mod initiative;

pub use initiative::{InitiativeEntry, InitiativeLedger, TurnAdvance, UpsertEntry};
