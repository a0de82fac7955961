use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::position::Position;

/// What a worker knows about a position whose successors are being classified as wins.
///
/// Created on the first won-successor update. `remaining` stays unset until the position is
/// first examined in a loss round, because only then are its forward moves generated.
#[derive(Clone, Debug)]
pub struct Estimate<A> {
    pub observed_max_depth: u16,
    pub remaining: Option<u32>,
    counted: FxHashSet<Position<A>>,
}

impl<A> Default for Estimate<A> {
    fn default() -> Self {
        Self {
            observed_max_depth: 0,
            remaining: None,
            counted: FxHashSet::default(),
        }
    }
}

impl<A: Eq + Hash> Estimate<A> {
    /// Records a won successor. Repeats of an already counted successor are ignored.
    pub fn observe(&mut self, successor: Position<A>, depth: u16) -> bool {
        if !self.counted.insert(successor) {
            return false;
        }
        self.observed_max_depth = self.observed_max_depth.max(depth);
        if let Some(rem) = self.remaining.as_mut() {
            *rem = rem.saturating_sub(1);
        }
        true
    }

    /// Sets the unresolved count from the number of distinct successors, once.
    pub fn initialize(&mut self, successors: usize) {
        if self.remaining.is_none() {
            let left = successors.saturating_sub(self.counted.len());
            self.remaining = Some(u32::try_from(left).unwrap_or(u32::MAX));
        }
    }

    /// Every successor is a known win.
    pub fn is_lost(&self) -> bool {
        self.remaining == Some(0) && !self.counted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(sq: usize) -> Position {
        Position::empty(4, true, ()).with(sq, b'K')
    }

    #[test]
    fn counts_each_successor_once() {
        let mut e = Estimate::default();
        assert!(e.observe(pos(0), 3));
        assert!(!e.observe(pos(0), 5));
        assert_eq!(e.observed_max_depth, 3);
        e.initialize(2);
        assert_eq!(e.remaining, Some(1));
        assert!(!e.is_lost());
        assert!(e.observe(pos(1), 5));
        assert!(e.is_lost());
        assert_eq!(e.observed_max_depth, 5);
    }

    #[test]
    fn initialization_happens_once() {
        let mut e: Estimate<()> = Estimate::default();
        e.observe(pos(2), 1);
        e.initialize(3);
        e.initialize(1);
        assert_eq!(e.remaining, Some(2));
    }
}
