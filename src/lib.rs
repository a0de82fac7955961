//! Retrograde analysis for small-material endgames of two-player board games.
//!
//! Every terminal position of each material configuration is enumerated, then win/loss
//! labels and exact depths to mate are propagated backward until nothing changes. The game
//! itself is supplied through [`rules::Rules`]; [`rules::chess`] provides pawnless chess on
//! any rectangular board.

pub mod board;
pub mod config;
pub mod coord;
pub mod enumerate;
pub mod error;
pub mod generate;
pub mod partition;
pub mod pieces;
pub mod position;
pub mod report;
pub mod rules;
pub mod solve;

pub use error::{Result, TablebaseError};
pub use position::Position;
pub use solve::{Outcome, Tablebase};
