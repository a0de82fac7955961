//! Placement of a configuration onto the board and collection of its terminal positions.
//!
//! Identical labels are placed as combinations, so every distinct board is produced once.
//! The group of the tracked (first) label is placed first and its lowest square is the
//! *lead*: scans are restricted to a set of lead squares, which is how the work is sharded
//! and how the symmetry reduction trims the search.

use std::ops::{Add, AddAssign, Range};

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use crate::board::Reflection;
use crate::enumerate::Configuration;
use crate::error::{Result, TablebaseError};
use crate::pieces::{group_labels, is_empty, LabelGroup, EMPTY};
use crate::position::Position;
use crate::rules::Rules;

pub type TerminalSet<A> = FxHashSet<Position<A>>;

/// Counters of one enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EnumerationStats {
    /// Distinct board placements scanned (each tried with both sides to move).
    pub placements: u64,
    /// Positions dropped by the validity filter.
    pub rejected: u64,
    /// Terminal positions found by the scan, before any symmetry expansion.
    pub terminal: u64,
}

impl Add for EnumerationStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            placements: self.placements + rhs.placements,
            rejected: self.rejected + rhs.rejected,
            terminal: self.terminal + rhs.terminal,
        }
    }
}

impl AddAssign for EnumerationStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Scans every placement whose lead square lies in `leads` and returns the terminal positions.
pub fn scan_leads<R: Rules>(
    rules: &R,
    config: &Configuration,
    leads: &[usize],
) -> (TerminalSet<R::Aux>, EnumerationStats) {
    let groups = group_labels(config.labels());
    let mut scan = Scan {
        rules,
        groups: &groups,
        board: vec![EMPTY; rules.board().size()],
        found: FxHashSet::default(),
        stats: EnumerationStats::default(),
    };
    scan.place_lead(leads);
    (scan.found, scan.stats)
}

/// Scans a contiguous range of lead squares (one partition's share).
pub fn scan_range<R: Rules>(
    rules: &R,
    config: &Configuration,
    leads: Range<usize>,
) -> (TerminalSet<R::Aux>, EnumerationStats) {
    let leads: Vec<usize> = leads.collect();
    scan_leads(rules, config, &leads)
}

/// All terminal positions of `config`, scanned in `shards` parallel pieces on the current
/// rayon pool.
///
/// With `symmetry`, reflection axes the rules declare safe for this piece set shrink the
/// lead squares to one half of the board per axis; the result is then closed under those
/// reflections, so it is the same set a full scan returns. The reduction only applies when
/// the tracked label occurs once.
pub fn enumerate_terminal<R: Rules>(
    rules: &R,
    config: &Configuration,
    shards: usize,
    symmetry: bool,
) -> Result<(TerminalSet<R::Aux>, EnumerationStats)> {
    if config.is_empty() {
        return Err(TablebaseError::invalid("configuration has no pieces"));
    }
    if config.labels().iter().any(|&l| is_empty(l)) {
        return Err(TablebaseError::invalid(format!(
            "configuration {config} contains the empty label"
        )));
    }
    let geometry = *rules.board();

    let axes: Vec<Reflection> = if symmetry && group_labels(config.labels())[0].count == 1 {
        [Reflection::Horizontal, Reflection::Vertical]
            .into_iter()
            .filter(|&axis| rules.is_symmetric(config.labels(), axis))
            .collect()
    } else {
        Vec::new()
    };

    let leads: Vec<usize> = (0..geometry.size())
        .filter(|&sq| {
            axes.iter().all(|axis| match axis {
                Reflection::Horizontal => geometry.in_left_half(sq),
                Reflection::Vertical => geometry.in_lower_half(sq),
            })
        })
        .collect();

    let chunk = leads.len().div_ceil(shards.max(1)).max(1);
    let (found, stats) = leads
        .par_chunks(chunk)
        .map(|part| scan_leads(rules, config, part))
        .reduce(
            || (FxHashSet::default(), EnumerationStats::default()),
            |(mut a, sa), (mut b, sb)| {
                if a.len() < b.len() {
                    std::mem::swap(&mut a, &mut b);
                }
                a.extend(b);
                (a, sa + sb)
            },
        );

    let found = if axes.is_empty() {
        found
    } else {
        let mut closed = FxHashSet::default();
        for pos in found {
            let mut orbit = vec![pos];
            for &axis in &axes {
                let images: Vec<_> = orbit.iter().map(|p| p.reflect(&geometry, axis)).collect();
                orbit.extend(images);
            }
            closed.extend(orbit);
        }
        closed
    };

    debug!(
        config = %config,
        placements = stats.placements,
        rejected = stats.rejected,
        terminal = found.len(),
        reflections = axes.len(),
        "enumerated terminal positions"
    );
    Ok((found, stats))
}

struct Scan<'a, R: Rules> {
    rules: &'a R,
    groups: &'a [LabelGroup],
    board: Vec<u8>,
    found: TerminalSet<R::Aux>,
    stats: EnumerationStats,
}

impl<R: Rules> Scan<'_, R> {
    fn place_lead(&mut self, leads: &[usize]) {
        let Some(lead) = self.groups.first() else {
            return;
        };
        let (label, count) = (lead.label, lead.count);
        let squares = self.board.len();

        for &sq in leads {
            if sq >= squares {
                continue;
            }
            self.board[sq] = label;
            // The rest of the tracked group sits strictly above the lead square.
            let above: Vec<usize> = (sq + 1..squares).collect();
            let mut chosen = Vec::with_capacity(count - 1);
            choose_k(&above, count - 1, 0, &mut chosen, &mut |chosen| {
                for &s in chosen {
                    self.board[s] = label;
                }
                self.place_group(1);
                for &s in chosen {
                    self.board[s] = EMPTY;
                }
            });
            self.board[sq] = EMPTY;
        }
    }

    fn place_group(&mut self, g_idx: usize) {
        if g_idx == self.groups.len() {
            self.visit();
            return;
        }
        let LabelGroup { label, count } = self.groups[g_idx];

        let free: Vec<usize> = self
            .board
            .iter()
            .enumerate()
            .filter(|&(_, &l)| is_empty(l))
            .map(|(sq, _)| sq)
            .collect();

        let mut chosen = Vec::with_capacity(count);
        choose_k(&free, count, 0, &mut chosen, &mut |chosen| {
            for &s in chosen {
                self.board[s] = label;
            }
            self.place_group(g_idx + 1);
            for &s in chosen {
                self.board[s] = EMPTY;
            }
        });
    }

    fn visit(&mut self) {
        self.stats.placements += 1;
        for side_to_move in [true, false] {
            let pos = Position::new(self.board.clone(), side_to_move, R::Aux::default());
            if !self.rules.is_valid(&pos) {
                self.stats.rejected += 1;
                continue;
            }
            if self.rules.is_terminal(&pos) {
                self.stats.terminal += 1;
                self.found.insert(pos);
            }
        }
    }
}

fn choose_k(
    free: &[usize],
    k: usize,
    start: usize,
    chosen: &mut Vec<usize>,
    cb: &mut impl FnMut(&[usize]),
) {
    if chosen.len() == k {
        cb(chosen);
        return;
    }
    let need = k - chosen.len();
    if free.len().saturating_sub(start) < need {
        return;
    }
    for i in start..free.len() {
        chosen.push(free[i]);
        choose_k(free, k, i + 1, chosen, cb);
        chosen.pop();
    }
}
