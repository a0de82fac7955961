//! Distributed retrograde solver.
//!
//! Positions are sharded across workers by a [`Partitioner`]. A worker only ever reads or
//! writes positions it owns; everything it learns about other positions is sent to their
//! owner as an [`Update`]. Workers share nothing but the read-only rules.
//!
//! Each round ends with the same exchange on every worker: deliver self-addressed updates,
//! send one [`RoundStatus`] to each peer, drain the inbox until every peer's status has
//! arrived (applying data as it comes), then meet the others at a barrier. Channels are
//! FIFO per sender, so a peer's status always trails that peer's data for the round. The
//! solve ends after the first round in which no worker queued an update.
//!
//! Loss detection does not reread other workers' tables: the owner of a position keeps an
//! [`Estimate`] counting how many of its distinct successors are known wins.

use std::mem;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::enumerate::permutations::scan_range;
use crate::enumerate::{Configuration, EnumerationStats, TerminalSet};
use crate::error::{Result, TablebaseError};
use crate::partition::Partitioner;
use crate::position::Position;
use crate::rules::Rules;
use crate::solve::Tablebase;

pub mod estimate;
pub mod message;
pub mod transport;

pub use estimate::Estimate;
pub use message::{Envelope, RoundStatus, Update};
use transport::{mesh, AbortOnPanic, Mailbox};

/// Solves from a known terminal set, handing each worker the positions it owns.
pub fn solve_distributed_from_terminal<R: Rules>(
    rules: &R,
    terminal: TerminalSet<R::Aux>,
    partitioner: &Partitioner,
) -> Result<Tablebase<R::Aux>> {
    let mut shards: Vec<TerminalSet<R::Aux>> = (0..partitioner.parts())
        .map(|_| FxHashSet::default())
        .collect();
    for pos in terminal {
        shards[partitioner.owner(&pos)].insert(pos);
    }
    let (table, _) = run_workers(rules, partitioner, shards, |shard| {
        (shard, EnumerationStats::default())
    })?;
    Ok(table)
}

/// Each worker enumerates the terminal positions of its own square range, then solves.
///
/// The configuration's first label must be the partitioner's tracked label, so that the
/// positions a worker enumerates are exactly the terminal positions it owns.
pub fn solve_distributed<R: Rules>(
    rules: &R,
    config: &Configuration,
    partitioner: &Partitioner,
) -> Result<(Tablebase<R::Aux>, EnumerationStats)> {
    if config.tracked() != Some(partitioner.tracked()) {
        return Err(TablebaseError::invalid(format!(
            "configuration {config} does not lead with tracked label '{}'",
            partitioner.tracked() as char
        )));
    }
    let ranges: Vec<Range<usize>> = (0..partitioner.parts())
        .map(|id| partitioner.range(id))
        .collect();
    run_workers(rules, partitioner, ranges, |range| {
        scan_range(rules, config, range)
    })
}

/// Spawns one thread per partition. Worker `i` starts by running `seed(inputs[i])` to obtain
/// its terminal positions.
fn run_workers<R, S, F>(
    rules: &R,
    partitioner: &Partitioner,
    inputs: Vec<S>,
    seed: F,
) -> Result<(Tablebase<R::Aux>, EnumerationStats)>
where
    R: Rules,
    S: Send,
    F: Fn(S) -> (TerminalSet<R::Aux>, EnumerationStats) + Sync,
{
    let workers = partitioner.parts();
    debug_assert_eq!(inputs.len(), workers);
    info!(workers, tracked = %(partitioner.tracked() as char), "starting distributed solve");

    let seed = &seed;
    let results: Vec<Result<(Tablebase<R::Aux>, EnumerationStats)>> =
        std::thread::scope(|scope| {
            let handles: Vec<_> = mesh::<R::Aux>(workers)
                .into_iter()
                .zip(inputs)
                .map(|(mailbox, input)| {
                    let partitioner = partitioner.clone();
                    scope.spawn(move || {
                        let id = mailbox.id();
                        let outcome = catch_unwind(AssertUnwindSafe(|| {
                            let _guard = AbortOnPanic(&mailbox);
                            let (terminal, stats) = seed(input);
                            Worker::new(rules, partitioner, &mailbox)
                                .run(terminal)
                                .map(|table| (table, stats))
                        }));
                        match outcome {
                            Ok(Ok(done)) => Ok(done),
                            Ok(Err(e)) => {
                                mailbox.broadcast_abort();
                                Err(e)
                            }
                            Err(_) => Err(TablebaseError::WorkerPanicked { worker: id }),
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(id, h)| {
                    h.join()
                        .unwrap_or(Err(TablebaseError::WorkerPanicked { worker: id }))
                })
                .collect()
        });

    let mut table = Tablebase::default();
    let mut stats = EnumerationStats::default();
    let mut failure: Option<TablebaseError> = None;
    for result in results {
        match result {
            Ok((shard, s)) => {
                table.absorb(shard);
                stats += s;
            }
            // A panic is the root cause; peers only report the hang-up it caused.
            Err(e @ TablebaseError::WorkerPanicked { .. }) => {
                if !matches!(failure, Some(TablebaseError::WorkerPanicked { .. })) {
                    failure = Some(e);
                }
            }
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    info!(
        wins = table.wins.len(),
        losses = table.losses.len(),
        max_depth = table.max_depth().unwrap_or(0),
        "distributed solve finished"
    );
    Ok((table, stats))
}

struct Worker<'a, R: Rules> {
    rules: &'a R,
    partitioner: Partitioner,
    mailbox: &'a Mailbox<R::Aux>,
    table: Tablebase<R::Aux>,
    /// Positions with a successor lost in the previous round.
    lose_frontier: FxHashSet<Position<R::Aux>>,
    /// Positions with a successor won in the previous round.
    win_frontier: FxHashSet<Position<R::Aux>>,
    estimates: FxHashMap<Position<R::Aux>, Estimate<R::Aux>>,
    /// Self-addressed updates, applied at the end of the round.
    local: Vec<Update<R::Aux>>,
    queued: bool,
}

impl<'a, R: Rules> Worker<'a, R> {
    fn new(rules: &'a R, partitioner: Partitioner, mailbox: &'a Mailbox<R::Aux>) -> Self {
        Self {
            rules,
            partitioner,
            mailbox,
            table: Tablebase::default(),
            lose_frontier: FxHashSet::default(),
            win_frontier: FxHashSet::default(),
            estimates: FxHashMap::default(),
            local: Vec::new(),
            queued: false,
        }
    }

    fn id(&self) -> usize {
        self.mailbox.id()
    }

    fn run(mut self, terminal: TerminalSet<R::Aux>) -> Result<Tablebase<R::Aux>> {
        for pos in &terminal {
            debug_assert_eq!(self.partitioner.owner(pos), self.id());
            for pred in distinct(self.rules.reverse_moves(pos)) {
                self.route(Update::LostSuccessor {
                    target: pred,
                    depth: 0,
                })?;
            }
        }
        for pos in terminal {
            self.table.record_loss(pos, 0);
        }
        let mut more = self.sync()?;

        let mut depth: u16 = 1;
        while more {
            if depth % 2 == 1 {
                self.win_round(depth)?;
            } else {
                self.loss_round(depth)?;
            }
            more = self.sync()?;
            depth += 1;
        }

        info!(
            worker = self.id(),
            wins = self.table.wins.len(),
            losses = self.table.losses.len(),
            rounds = depth - 1,
            "worker reached fixpoint"
        );
        Ok(self.table)
    }

    /// Every owned position with a freshly lost successor wins at `depth`.
    fn win_round(&mut self, depth: u16) -> Result<()> {
        let frontier = mem::take(&mut self.lose_frontier);
        let mut won = 0usize;
        for pos in frontier {
            if self.table.is_classified(&pos) {
                continue;
            }
            for pred in distinct(self.rules.reverse_moves(&pos)) {
                self.route(Update::WonSuccessor {
                    target: pred,
                    successor: pos.clone(),
                    depth,
                })?;
            }
            self.table.record_win(pos, depth);
            won += 1;
        }
        debug!(worker = self.id(), depth, wins = won, "win round");
        Ok(())
    }

    /// Owned positions whose successors are now all known wins lose at `depth`.
    fn loss_round(&mut self, depth: u16) -> Result<()> {
        let frontier = mem::take(&mut self.win_frontier);
        let mut lost = 0usize;
        for pos in frontier {
            if self.table.is_classified(&pos) {
                continue;
            }
            let Some(estimate) = self.estimates.get_mut(&pos) else {
                continue;
            };
            if estimate.remaining.is_none() {
                let successors = distinct(self.rules.forward_moves(&pos)).len();
                estimate.initialize(successors);
            }
            if !estimate.is_lost() {
                continue;
            }
            let d = estimate.observed_max_depth + 1;
            debug_assert_eq!(d, depth);
            // Classified positions ignore further updates, so the estimate is done.
            self.estimates.remove(&pos);

            for pred in distinct(self.rules.reverse_moves(&pos)) {
                self.route(Update::LostSuccessor {
                    target: pred,
                    depth: d,
                })?;
            }
            self.table.record_loss(pos, d);
            lost += 1;
        }
        debug!(worker = self.id(), depth, losses = lost, "loss round");
        Ok(())
    }

    fn route(&mut self, update: Update<R::Aux>) -> Result<()> {
        self.queued = true;
        let owner = self.partitioner.owner(update.target());
        if owner == self.id() {
            self.local.push(update);
            Ok(())
        } else {
            self.mailbox.send(owner, Envelope::Data(update))
        }
    }

    fn deliver(&mut self, update: Update<R::Aux>) {
        if self.table.is_classified(update.target()) {
            return;
        }
        match update {
            Update::LostSuccessor { target, .. } => {
                self.lose_frontier.insert(target);
            }
            Update::WonSuccessor {
                target,
                successor,
                depth,
            } => {
                self.estimates
                    .entry(target.clone())
                    .or_default()
                    .observe(successor, depth);
                self.win_frontier.insert(target);
            }
        }
    }

    /// End-of-round exchange. Returns whether any worker queued work this round.
    fn sync(&mut self) -> Result<bool> {
        for update in mem::take(&mut self.local) {
            self.deliver(update);
        }
        let local_more = mem::take(&mut self.queued);
        let status = if local_more {
            RoundStatus::MoreWork
        } else {
            RoundStatus::NoWork
        };
        self.mailbox.broadcast_status(status)?;

        let mut any_more = local_more;
        let mut pending = self.mailbox.workers() - 1;
        while pending > 0 {
            match self.mailbox.recv()? {
                Envelope::Data(update) => self.deliver(update),
                Envelope::Control(status) => {
                    pending -= 1;
                    any_more |= status == RoundStatus::MoreWork;
                }
                Envelope::Abort { worker } => {
                    warn!(worker = self.id(), peer = worker, "peer aborted");
                    return Err(self
                        .mailbox
                        .transport(format!("peer {worker} aborted")));
                }
            }
        }
        self.mailbox.wait();
        Ok(any_more)
    }
}

fn distinct<A: Eq + std::hash::Hash>(positions: Vec<Position<A>>) -> FxHashSet<Position<A>> {
    positions.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardGeometry;
    use crate::enumerate::enumerate_terminal;
    use crate::rules::chess::ChessRules;
    use crate::solve::shared::solve_shared;

    #[test]
    fn single_worker_matches_shared_memory() {
        let rules = ChessRules::new(BoardGeometry::new(4, 4));
        let config = Configuration::new(b"kKq".to_vec());
        let (terminal, _) = enumerate_terminal(&rules, &config, 1, false).unwrap();
        let shared = solve_shared(&rules, terminal.clone(), 1).unwrap();
        let p = Partitioner::new(b'k', 16, 1).unwrap();
        let dist = solve_distributed_from_terminal(&rules, terminal, &p).unwrap();
        assert_eq!(shared.depth_to_mate, dist.depth_to_mate);
        assert_eq!(shared.wins, dist.wins);
    }

    #[test]
    fn tracked_label_must_lead_the_configuration() {
        let rules = ChessRules::new(BoardGeometry::new(4, 4));
        let config = Configuration::new(b"Kkq".to_vec());
        let p = Partitioner::new(b'k', 16, 2).unwrap();
        assert!(matches!(
            solve_distributed(&rules, &config, &p),
            Err(TablebaseError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn workers_own_what_they_enumerate() {
        let rules = ChessRules::new(BoardGeometry::new(4, 4));
        let config = Configuration::new(b"kKr".to_vec());
        let p = Partitioner::new(b'k', 16, 3).unwrap();
        for id in 0..3 {
            let (terminal, _) = scan_range(&rules, &config, p.range(id));
            assert!(terminal.iter().all(|pos| p.owner(pos) == id));
        }
    }
}
