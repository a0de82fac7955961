//! Retrograde solvers and the tables they produce.
//!
//! Both solvers run the same level-synchronous backward induction from the terminal
//! positions and produce identical [`Tablebase`]s:
//! - [`shared`]: one address space, each round processed on a rayon pool;
//! - [`distributed`]: the key space sharded across workers that exchange updates only by
//!   message.
//!
//! Depths count plies to mate: losses sit at even depths (terminal positions at 0), wins at
//! odd depths.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::position::{NoAux, Position};

pub mod distributed;
pub mod probe;
pub mod shared;

pub use distributed::{solve_distributed, solve_distributed_from_terminal};
pub use probe::{probe, ProbeLine};
pub use shared::{retrograde, solve_shared};

/// Game-theoretic value of a decided position, for the side to move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Forced win, mate delivered after this many plies.
    Win(u16),
    /// Forced loss, mated after this many plies.
    Loss(u16),
}

impl Outcome {
    pub fn depth(self) -> u16 {
        match self {
            Outcome::Win(d) | Outcome::Loss(d) => d,
        }
    }
}

/// Win set, loss set and depth-to-mate map of one configuration.
///
/// A position is in at most one of `wins` and `losses`; every classified position has a
/// depth. Positions in neither set are draws (or unreachable from a terminal position).
#[derive(Clone, Debug)]
pub struct Tablebase<A = NoAux> {
    pub wins: FxHashSet<Position<A>>,
    pub losses: FxHashSet<Position<A>>,
    pub depth_to_mate: FxHashMap<Position<A>, u16>,
}

impl<A> Default for Tablebase<A> {
    fn default() -> Self {
        Self {
            wins: FxHashSet::default(),
            losses: FxHashSet::default(),
            depth_to_mate: FxHashMap::default(),
        }
    }
}

impl<A: Eq + Hash> Tablebase<A> {
    pub fn is_classified(&self, pos: &Position<A>) -> bool {
        self.wins.contains(pos) || self.losses.contains(pos)
    }

    pub fn depth(&self, pos: &Position<A>) -> Option<u16> {
        self.depth_to_mate.get(pos).copied()
    }

    pub fn outcome(&self, pos: &Position<A>) -> Option<Outcome> {
        let depth = self.depth(pos)?;
        if self.wins.contains(pos) {
            Some(Outcome::Win(depth))
        } else if self.losses.contains(pos) {
            Some(Outcome::Loss(depth))
        } else {
            None
        }
    }

    /// Number of classified positions.
    pub fn len(&self) -> usize {
        self.wins.len() + self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wins.is_empty() && self.losses.is_empty()
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.depth_to_mate.values().copied().max()
    }

    /// Positions per depth, shallowest first.
    pub fn depth_histogram(&self) -> BTreeMap<u16, usize> {
        let mut hist = BTreeMap::new();
        for &d in self.depth_to_mate.values() {
            *hist.entry(d).or_insert(0) += 1;
        }
        hist
    }

    pub(crate) fn record_win(&mut self, pos: Position<A>, depth: u16)
    where
        A: Clone,
    {
        self.depth_to_mate.insert(pos.clone(), depth);
        self.wins.insert(pos);
    }

    pub(crate) fn record_loss(&mut self, pos: Position<A>, depth: u16)
    where
        A: Clone,
    {
        self.depth_to_mate.insert(pos.clone(), depth);
        self.losses.insert(pos);
    }

    /// Folds in another table over a disjoint key set.
    pub fn absorb(&mut self, other: Tablebase<A>) {
        debug_assert!(other.wins.iter().all(|p| !self.is_classified(p)));
        debug_assert!(other.losses.iter().all(|p| !self.is_classified(p)));
        self.wins.extend(other.wins);
        self.losses.extend(other.losses);
        self.depth_to_mate.extend(other.depth_to_mate);
    }
}
