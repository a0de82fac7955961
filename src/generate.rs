//! End-to-end tablebase generation: configurations, terminal positions, retrograde solve.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::config::{SolverConfig, SolverMode};
use crate::enumerate::{
    configurations, enumerate_terminal, Configuration, EnumerationStats, TerminalSet,
};
use crate::error::{Result, TablebaseError};
use crate::partition::Partitioner;
use crate::rules::Rules;
use crate::solve::{retrograde, solve_distributed, Tablebase};

/// A solved configuration.
#[derive(Debug)]
pub struct Solved<A> {
    pub configuration: Configuration,
    pub table: Tablebase<A>,
    pub enumeration: EnumerationStats,
    /// Time spent finding this configuration's terminal positions. `None` when the workers
    /// enumerate inside the solve.
    pub enumeration_ms: Option<u64>,
    pub solve_ms: u64,
    /// False when moves out of the piece set can decide positions, which the table then
    /// leaves undetermined.
    pub complete: bool,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub struct Generator<R: Rules> {
    rules: R,
    config: SolverConfig,
    pool: ThreadPool,
}

impl<R: Rules> Generator<R> {
    pub fn new(rules: R, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        if *rules.board() != config.geometry() {
            return Err(TablebaseError::invalid(format!(
                "rules play on {}x{} but the configuration asks for {}x{}",
                rules.board().rows,
                rules.board().cols,
                config.rows,
                config.cols
            )));
        }
        let royal = config.royal_labels()?;
        if let Some(&l) = royal.iter().find(|&&l| !rules.is_royal(l)) {
            return Err(TablebaseError::invalid(format!(
                "'{}' is not a royal piece under these rules",
                l as char
            )));
        }
        if let Some(&l) = config.non_royal_labels()?.iter().find(|&&l| rules.is_royal(l)) {
            return Err(TablebaseError::invalid(format!(
                "'{}' is royal and cannot be in the non-royal pool",
                l as char
            )));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("tablebase-{i}"))
            .build()?;
        Ok(Self {
            rules,
            config,
            pool,
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn configurations(&self) -> Result<Vec<Configuration>> {
        configurations(
            &self.config.royal_labels()?,
            &self.config.non_royal_labels()?,
            self.config.pieces,
        )
    }

    /// Terminal positions of one configuration, scanned on the generator's pool.
    pub fn terminal_positions(
        &self,
        config: &Configuration,
    ) -> Result<(TerminalSet<R::Aux>, EnumerationStats)> {
        self.pool.install(|| {
            enumerate_terminal(
                &self.rules,
                config,
                self.config.threads,
                self.config.symmetry,
            )
        })
    }

    /// Solves one configuration with the configured solver.
    pub fn solve(&self, config: &Configuration) -> Result<Solved<R::Aux>> {
        match self.config.mode {
            SolverMode::Shared => {
                let started = Instant::now();
                let terminal = self.terminal_positions(config)?;
                Ok(self.solve_terminal(config.clone(), terminal, started.elapsed()))
            }
            SolverMode::Distributed { workers } => {
                let tracked = config.tracked().ok_or_else(|| {
                    TablebaseError::invalid("cannot partition an empty configuration")
                })?;
                let partitioner = Partitioner::new(tracked, self.rules.board().size(), workers)?;
                let started = Instant::now();
                let (table, stats) = solve_distributed(&self.rules, config, &partitioner)?;
                Ok(self.finish(config.clone(), table, stats, None, started.elapsed()))
            }
        }
    }

    /// Solves every configuration. In shared mode the terminal sets of all configurations
    /// are enumerated in parallel first.
    pub fn run(&self) -> Result<Vec<Solved<R::Aux>>> {
        let configs = self.configurations()?;
        info!(
            configurations = configs.len(),
            board = %format!("{}x{}", self.config.rows, self.config.cols),
            mode = ?self.config.mode,
            "generating tablebases"
        );

        match self.config.mode {
            SolverMode::Shared => {
                let terminal: Vec<_> = self.pool.install(|| {
                    configs
                        .par_iter()
                        .map(|c| -> Result<_> {
                            let started = Instant::now();
                            let found = enumerate_terminal(
                                &self.rules,
                                c,
                                self.config.threads,
                                self.config.symmetry,
                            )?;
                            Ok((found, started.elapsed()))
                        })
                        .collect::<Result<Vec<_>>>()
                })?;
                Ok(configs
                    .into_iter()
                    .zip(terminal)
                    .map(|(config, (found, took))| self.solve_terminal(config, found, took))
                    .collect())
            }
            SolverMode::Distributed { .. } => configs.iter().map(|c| self.solve(c)).collect(),
        }
    }

    fn solve_terminal(
        &self,
        configuration: Configuration,
        (terminal, stats): (TerminalSet<R::Aux>, EnumerationStats),
        enumeration: Duration,
    ) -> Solved<R::Aux> {
        let started = Instant::now();
        let table = self.pool.install(|| retrograde(&self.rules, terminal));
        self.finish(
            configuration,
            table,
            stats,
            Some(enumeration),
            started.elapsed(),
        )
    }

    fn finish(
        &self,
        configuration: Configuration,
        table: Tablebase<R::Aux>,
        enumeration: EnumerationStats,
        enumeration_time: Option<Duration>,
        solve_time: Duration,
    ) -> Solved<R::Aux> {
        let complete = !self.rules.leaves_piece_set(configuration.labels());
        let solve_ms = millis(solve_time);
        info!(
            configuration = %configuration,
            wins = table.wins.len(),
            losses = table.losses.len(),
            max_depth = table.max_depth().unwrap_or(0),
            solve_ms,
            "configuration solved"
        );
        if !complete {
            warn!(
                configuration = %configuration,
                "moves leave the piece set; positions they decide stay undetermined"
            );
        }
        Solved {
            configuration,
            table,
            enumeration,
            enumeration_ms: enumeration_time.map(millis),
            solve_ms,
            complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardGeometry;
    use crate::coord::Coord;
    use crate::position::Position;
    use crate::rules::chess::ChessRules;

    fn small(mode: SolverMode) -> SolverConfig {
        SolverConfig {
            rows: 4,
            cols: 4,
            pieces: 3,
            non_royal: "qQ".to_string(),
            threads: 2,
            mode,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn rejects_mismatched_board() {
        let rules = ChessRules::standard();
        assert!(Generator::new(rules, small(SolverMode::Shared)).is_err());
    }

    #[test]
    fn rejects_non_royal_kings() {
        let rules = ChessRules::new(BoardGeometry::new(4, 4));
        let cfg = SolverConfig {
            royal: "qQ".to_string(),
            non_royal: "rR".to_string(),
            ..small(SolverMode::Shared)
        };
        assert!(Generator::new(rules, cfg).is_err());
    }

    #[test]
    fn solvers_agree_on_every_configuration() {
        let shared = Generator::new(
            ChessRules::new(BoardGeometry::new(4, 4)),
            small(SolverMode::Shared),
        )
        .unwrap()
        .run()
        .unwrap();
        let dist = Generator::new(
            ChessRules::new(BoardGeometry::new(4, 4)),
            small(SolverMode::Distributed { workers: 3 }),
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.len(), dist.len());
        for (a, b) in shared.iter().zip(&dist) {
            assert_eq!(a.configuration, b.configuration);
            assert_eq!(a.table.depth_to_mate, b.table.depth_to_mate);
            assert_eq!(a.table.wins, b.table.wins);
            assert_eq!(a.table.losses, b.table.losses);
            assert!(a.complete && b.complete);
            assert!(a.enumeration_ms.is_some());
            assert_eq!(b.enumeration_ms, None);
        }
    }

    #[test]
    fn configurations_are_timed_separately() {
        let cfg = SolverConfig {
            rows: 5,
            cols: 5,
            non_royal: "qQrR".to_string(),
            ..small(SolverMode::Shared)
        };
        let generator = Generator::new(ChessRules::new(BoardGeometry::new(5, 5)), cfg).unwrap();
        let started = Instant::now();
        let solved = generator.run().unwrap();
        let wall = millis(started.elapsed());

        assert_eq!(solved.len(), 2);
        // Enumeration runs for all configurations at once, then the solves run one by one.
        let enumeration = solved
            .iter()
            .filter_map(|s| s.enumeration_ms)
            .max()
            .unwrap();
        let solving: u64 = solved.iter().map(|s| s.solve_ms).sum();
        assert!(enumeration + solving <= wall);
    }

    #[test]
    fn wins_through_a_capture_are_flagged_incomplete() {
        let cfg = SolverConfig {
            pieces: 4,
            non_royal: "qR".to_string(),
            ..small(SolverMode::Shared)
        };
        let generator = Generator::new(ChessRules::new(BoardGeometry::new(4, 4)), cfg).unwrap();
        let solved = generator.run().unwrap();
        assert_eq!(solved.len(), 1);
        assert!(!solved[0].complete);

        // White Ka1 Rc3, black qb1 kd4, White to move: Kxb1 wins, but only in the KRK table.
        let g = *generator.rules().board();
        let at = |file: i16, rank: i16| g.sq_of(Coord::new(file, rank)).unwrap();
        let pos = Position::empty(g.size(), true, ())
            .with(at(0, 0), b'K')
            .with(at(2, 2), b'R')
            .with(at(1, 0), b'q')
            .with(at(3, 3), b'k');
        let rules = generator.rules();
        assert!(rules.is_valid(&pos));
        assert!(rules
            .forward_moves(&pos)
            .iter()
            .any(|next| next.piece_count() == 3));
        assert_eq!(solved[0].table.outcome(&pos), None);
    }
}
