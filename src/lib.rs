//! Zombie Escape: a deterministic, turn-based pursuit engine.
//!
//! One agent walks toward an exit on a bounded grid while pursuers close in
//! with a fixed greedy rule. `sim::level::load_level` builds a `GridState`
//! from a character layout, `sim::step::move_player` resolves one turn, and
//! `sim::session::Session` strings levels together.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use domain::entity::{Direction, Position, Pursuer, Status};
pub use domain::tile::Cell;
pub use error::LevelFormatError;
pub use sim::level::{load_level, Catalog, LevelDef, Tier};
pub use sim::session::{Advance, Mode, Session};
pub use sim::step::{move_player, MoveResult, DEFAULT_SUBSTEPS};
pub use sim::world::{GridState, Snapshot};
