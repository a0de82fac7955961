use std::collections::BTreeMap;
use std::hash::Hash;

use serde::Serialize;

use crate::board::BoardGeometry;
use crate::enumerate::{Configuration, EnumerationStats};
use crate::generate::Solved;

/// Summary of one solved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub configuration: Configuration,
    pub enumeration: EnumerationStats,
    /// Terminal positions after symmetry expansion (the depth-0 losses).
    pub terminal: usize,
    pub wins: usize,
    pub losses: usize,
    pub max_depth: Option<u16>,
    /// Longest forced win for the side to move, in plies.
    pub longest_win: Option<u16>,
    /// Classified positions per depth to mate.
    pub depths: BTreeMap<u16, usize>,
    /// False when some positions are decided only by moves into another piece set and are
    /// therefore missing from the counts above.
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_ms: Option<u64>,
    pub solve_ms: u64,
}

impl SolveReport {
    pub fn new<A: Eq + Hash>(solved: &Solved<A>) -> Self {
        let table = &solved.table;
        let depths = table.depth_histogram();
        Self {
            configuration: solved.configuration.clone(),
            enumeration: solved.enumeration,
            terminal: depths.get(&0).copied().unwrap_or(0),
            wins: table.wins.len(),
            losses: table.losses.len(),
            max_depth: table.max_depth(),
            longest_win: table.wins.iter().filter_map(|p| table.depth(p)).max(),
            depths,
            complete: solved.complete,
            enumeration_ms: solved.enumeration_ms,
            solve_ms: solved.solve_ms,
        }
    }
}

/// Everything the runner prints.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub board: BoardGeometry,
    pub mode: String,
    pub configurations: Vec<SolveReport>,
}
