//! Shared-memory retrograde solver.
//!
//! Each round walks the current frontier on a rayon pool. Workers read the win/loss tables
//! as they stood at the start of the round and accumulate into thread-local buffers, which
//! are merged under a single lock once per buffer. Classifications are published only after
//! the round, so a round never observes its own output.

use std::hash::Hash;
use std::sync::Mutex;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::enumerate::TerminalSet;
use crate::error::Result;
use crate::position::Position;
use crate::rules::Rules;
use crate::solve::Tablebase;

/// Output of one round: positions classified at this level and unclassified predecessors
/// forming the next frontier.
struct Round<A> {
    classified: Vec<Position<A>>,
    candidates: FxHashSet<Position<A>>,
}

impl<A> Default for Round<A> {
    fn default() -> Self {
        Self {
            classified: Vec::new(),
            candidates: FxHashSet::default(),
        }
    }
}

impl<A: Eq + Hash> Round<A> {
    fn absorb(&mut self, other: Round<A>) {
        self.classified.extend(other.classified);
        self.candidates.extend(other.candidates);
    }
}

/// Builds a pool of `threads` threads and solves on it.
pub fn solve_shared<R: Rules>(
    rules: &R,
    terminal: TerminalSet<R::Aux>,
    threads: usize,
) -> Result<Tablebase<R::Aux>> {
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool.install(|| retrograde(rules, terminal)))
}

/// Level-synchronous backward induction on the current rayon pool.
pub fn retrograde<R: Rules>(rules: &R, terminal: TerminalSet<R::Aux>) -> Tablebase<R::Aux> {
    let mut table = Tablebase::default();
    let terminal_count = terminal.len();
    let init = expand(&terminal, rules, &table);
    for pos in terminal {
        table.record_loss(pos, 0);
    }
    let mut lose_frontier: FxHashSet<Position<R::Aux>> = init
        .candidates
        .into_iter()
        .filter(|p| !table.is_classified(p))
        .collect();

    let mut depth: u16 = 1;
    loop {
        let round = win_round(rules, &table, &lose_frontier);
        debug!(
            depth,
            frontier = lose_frontier.len(),
            wins = round.classified.len(),
            "win round"
        );
        if round.classified.is_empty() {
            break;
        }
        for pos in round.classified {
            table.record_win(pos, depth);
        }
        let win_frontier: FxHashSet<_> = round
            .candidates
            .into_iter()
            .filter(|p| !table.is_classified(p))
            .collect();
        depth += 1;

        let round = loss_round(rules, &table, &win_frontier);
        debug!(
            depth,
            frontier = win_frontier.len(),
            losses = round.classified.len(),
            "loss round"
        );
        if round.classified.is_empty() {
            break;
        }
        for pos in round.classified {
            table.record_loss(pos, depth);
        }
        lose_frontier = round
            .candidates
            .into_iter()
            .filter(|p| !table.is_classified(p))
            .collect();
        depth += 1;
    }

    info!(
        terminal = terminal_count,
        wins = table.wins.len(),
        losses = table.losses.len(),
        max_depth = table.max_depth().unwrap_or(0),
        "retrograde fixpoint reached"
    );
    table
}

/// Unclassified predecessors of every position in `from`.
fn expand<R: Rules>(
    from: &FxHashSet<Position<R::Aux>>,
    rules: &R,
    table: &Tablebase<R::Aux>,
) -> Round<R::Aux> {
    run_round(from, |pos, buf| {
        for pred in rules.reverse_moves(pos) {
            if !table.is_classified(&pred) {
                buf.candidates.insert(pred);
            }
        }
    })
}

/// Every unclassified predecessor of a fresh loss wins: moving into the loss is enough.
fn win_round<R: Rules>(
    rules: &R,
    table: &Tablebase<R::Aux>,
    frontier: &FxHashSet<Position<R::Aux>>,
) -> Round<R::Aux> {
    run_round(frontier, |pos, buf| {
        if table.is_classified(pos) {
            return;
        }
        buf.classified.push(pos.clone());
        for pred in rules.reverse_moves(pos) {
            if !table.is_classified(&pred) {
                buf.candidates.insert(pred);
            }
        }
    })
}

/// A position loses once it has moves and every one of them reaches a win for the opponent.
fn loss_round<R: Rules>(
    rules: &R,
    table: &Tablebase<R::Aux>,
    frontier: &FxHashSet<Position<R::Aux>>,
) -> Round<R::Aux> {
    run_round(frontier, |pos, buf| {
        if table.is_classified(pos) {
            return;
        }
        let succ = rules.forward_moves(pos);
        if succ.is_empty() || !succ.iter().all(|s| table.wins.contains(s)) {
            return;
        }
        buf.classified.push(pos.clone());
        for pred in rules.reverse_moves(pos) {
            if !table.is_classified(&pred) {
                buf.candidates.insert(pred);
            }
        }
    })
}

fn run_round<A, F>(frontier: &FxHashSet<Position<A>>, visit: F) -> Round<A>
where
    A: Eq + Hash + Send + Sync,
    F: Fn(&Position<A>, &mut Round<A>) + Sync,
{
    let merged: Mutex<Round<A>> = Mutex::new(Round::default());
    frontier
        .par_iter()
        .fold(Round::default, |mut buf, pos| {
            visit(pos, &mut buf);
            buf
        })
        .for_each(|buf| {
            let mut out = merged.lock().unwrap_or_else(|e| e.into_inner());
            out.absorb(buf);
        });
    merged.into_inner().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardGeometry;
    use crate::enumerate::{enumerate_terminal, Configuration};
    use crate::rules::chess::ChessRules;

    fn solve(rows: u8, cols: u8, config: &[u8]) -> (ChessRules, Tablebase) {
        let rules = ChessRules::new(BoardGeometry::new(rows, cols));
        let config = Configuration::new(config.to_vec());
        let (terminal, _) = enumerate_terminal(&rules, &config, 1, false).unwrap();
        let table = solve_shared(&rules, terminal, 2).unwrap();
        (rules, table)
    }

    #[test]
    fn wins_and_losses_are_disjoint() {
        let (_, table) = solve(4, 4, b"kKq");
        assert!(!table.wins.is_empty());
        assert!(table.wins.is_disjoint(&table.losses));
        assert_eq!(table.depth_to_mate.len(), table.len());
    }

    #[test]
    fn depths_have_the_parity_of_their_outcome() {
        let (_, table) = solve(4, 4, b"kKq");
        for p in &table.wins {
            assert_eq!(table.depth(p).unwrap() % 2, 1);
        }
        for p in &table.losses {
            assert_eq!(table.depth(p).unwrap() % 2, 0);
        }
    }

    #[test]
    fn depths_are_minimax_consistent() {
        let (rules, table) = solve(4, 4, b"kKr");
        for p in &table.losses {
            let d = table.depth(p).unwrap();
            if d == 0 {
                assert!(rules.is_terminal(p));
                continue;
            }
            let succ = rules.forward_moves(p);
            assert!(succ.iter().all(|s| table.wins.contains(s)));
            assert!(succ.iter().all(|s| table.depth(s).unwrap() < d));
            assert!(succ.iter().any(|s| table.depth(s) == Some(d - 1)));
        }
        for p in &table.wins {
            let d = table.depth(p).unwrap();
            let succ = rules.forward_moves(p);
            assert!(succ
                .iter()
                .any(|s| table.losses.contains(s) && table.depth(s) == Some(d - 1)));
            assert!(succ
                .iter()
                .all(|s| !table.losses.contains(s) || table.depth(s).unwrap() >= d - 1));
        }
    }

    #[test]
    fn thread_count_does_not_change_the_result() {
        let rules = ChessRules::new(BoardGeometry::new(4, 4));
        let config = Configuration::new(b"kKq".to_vec());
        let (terminal, _) = enumerate_terminal(&rules, &config, 1, false).unwrap();
        let a = solve_shared(&rules, terminal.clone(), 1).unwrap();
        let b = solve_shared(&rules, terminal, 4).unwrap();
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.losses, b.losses);
        assert_eq!(a.depth_to_mate, b.depth_to_mate);
    }
}
