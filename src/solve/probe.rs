use crate::error::{Result, TablebaseError};
use crate::position::Position;
use crate::rules::Rules;
use crate::solve::{Outcome, Tablebase};

/// A forced line from a decided position to mate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeLine<A> {
    /// Plies played; equals the start position's depth to mate.
    pub plies: u16,
    /// Start position first, terminal position last.
    pub positions: Vec<Position<A>>,
}

impl<A> ProbeLine<A> {
    pub fn end(&self) -> Option<&Position<A>> {
        self.positions.last()
    }
}

/// Replays optimal play from `start`: the winner always moves to a loss one ply shallower,
/// the loser to a win one ply shallower, until a terminal position is reached.
pub fn probe<R: Rules>(
    rules: &R,
    table: &Tablebase<R::Aux>,
    start: &Position<R::Aux>,
) -> Result<ProbeLine<R::Aux>> {
    let mut outcome = table.outcome(start).ok_or(TablebaseError::Undetermined)?;
    let plies = outcome.depth();
    let mut positions = vec![start.clone()];
    let mut current = start.clone();

    while outcome.depth() > 0 {
        let depth = outcome.depth();
        let want = match outcome {
            Outcome::Win(_) => Outcome::Loss(depth - 1),
            Outcome::Loss(_) => Outcome::Win(depth - 1),
        };
        let next = rules
            .forward_moves(&current)
            .into_iter()
            .find(|s| table.outcome(s) == Some(want))
            .ok_or(TablebaseError::BrokenLine { depth })?;
        positions.push(next.clone());
        current = next;
        outcome = want;
    }

    Ok(ProbeLine { plies, positions })
}
