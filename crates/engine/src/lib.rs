//! Whisperspace Engine library.
//!
//! Server-side plumbing around the rules engine in `whisperspace-domain`.
//!
//! ## Structure
//!
//! - `use_cases/` - Dice-driven attack and initiative flows
//! - `infrastructure/` - Ports, settings and the dice roll dispatcher
//! - `api/` - HTTP calculation relay
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
