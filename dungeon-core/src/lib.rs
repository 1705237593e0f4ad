//! Chat-driven text-adventure engine with an AI Dungeon Master.
//!
//! This crate provides:
//! - An in-memory game state merged turn-by-turn from model deltas
//! - A dice-rolling tool the model can invoke
//! - The turn processor bridging player input, the Gemini chat
//!   session, and the state-update protocol
//!
//! # Quick Start
//!
//! ```ignore
//! use dungeon_core::{GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::new(SessionConfig::new())?;
//!
//!     let outcome = session.player_action("I attack the shadow").await?;
//!     println!("{}", outcome.narrative);
//!     Ok(())
//! }
//! ```

pub mod dice;
pub mod dm;
pub mod fence;
pub mod merge;
pub mod session;
pub mod state;
pub mod testing;
pub mod tools;

// Primary public API
pub use dm::{DmConfig, DmError, DungeonMaster, TurnOutcome, TurnWarning};
pub use session::{GameSession, SessionConfig, SessionError};
pub use state::{GameState, LogEntry, LogRole};
pub use testing::{MockDm, TestHarness};
