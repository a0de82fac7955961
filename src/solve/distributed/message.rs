use crate::position::Position;

/// A fact about a position, addressed to the worker that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update<A> {
    /// One of `target`'s successors was classified a loss at `depth`, so `target` wins.
    LostSuccessor { target: Position<A>, depth: u16 },
    /// `successor`, reachable from `target` in one move, was classified a win at `depth`.
    WonSuccessor {
        target: Position<A>,
        successor: Position<A>,
        depth: u16,
    },
}

impl<A> Update<A> {
    pub fn target(&self) -> &Position<A> {
        match self {
            Update::LostSuccessor { target, .. } | Update::WonSuccessor { target, .. } => target,
        }
    }
}

/// What a worker reports at the end of a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// The worker queued at least one update this round.
    MoreWork,
    NoWork,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope<A> {
    Data(Update<A>),
    /// Exactly one per peer per round, sent after all of that round's data.
    Control(RoundStatus),
    /// The sender failed and will not reach the end of the round.
    Abort { worker: usize },
}
