//! Enumeration of material configurations and of their terminal positions.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::pieces::{render_labels, PieceLabel};

pub mod configs;
pub mod permutations;

pub use configs::configurations;
pub use permutations::{enumerate_terminal, scan_leads, EnumerationStats, TerminalSet};

/// An ordered multiset of piece labels placed together on the board.
///
/// The first label is the tracked piece: the enumerator places its group first and the
/// partitioner shards positions by its square.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    labels: Vec<PieceLabel>,
}

impl Configuration {
    pub fn new(labels: Vec<PieceLabel>) -> Self {
        Self { labels }
    }

    #[inline]
    pub fn labels(&self) -> &[PieceLabel] {
        &self.labels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn tracked(&self) -> Option<PieceLabel> {
        self.labels.first().copied()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_labels(&self.labels))
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
