use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{BoardGeometry, MAX_EDGE};
use crate::error::{Result, TablebaseError};
use crate::pieces::PieceLabel;

/// How positions are solved once their terminal set is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverMode {
    /// One process, each round parallelized on the rayon pool.
    Shared,
    /// The key space sharded across `workers` message-passing workers.
    Distributed { workers: usize },
}

fn default_edge() -> u8 {
    8
}

fn default_pieces() -> usize {
    3
}

fn default_royal() -> String {
    "kK".to_string()
}

fn default_non_royal() -> String {
    "qQrR".to_string()
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_mode() -> SolverMode {
    SolverMode::Shared
}

fn default_symmetry() -> bool {
    true
}

/// Tablebase generation settings (JSON-loadable; every field has a default).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SolverConfig {
    #[serde(default = "default_edge")]
    pub rows: u8,
    #[serde(default = "default_edge")]
    pub cols: u8,

    /// Pieces per configuration, royal pieces included.
    #[serde(default = "default_pieces")]
    pub pieces: usize,

    /// Exactly two labels, one per side.
    #[serde(default = "default_royal")]
    pub royal: String,

    /// Pool the remaining `pieces - 2` pieces are drawn from.
    #[serde(default = "default_non_royal")]
    pub non_royal: String,

    #[serde(default = "default_threads")]
    pub threads: usize,

    #[serde(default = "default_mode")]
    pub mode: SolverMode,

    /// Royal label used to partition positions. Defaults to the first royal label.
    #[serde(default)]
    pub tracked: Option<char>,

    /// Enumerate only one half of the board per symmetry axis the rules allow.
    #[serde(default = "default_symmetry")]
    pub symmetry: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rows: default_edge(),
            cols: default_edge(),
            pieces: default_pieces(),
            royal: default_royal(),
            non_royal: default_non_royal(),
            threads: default_threads(),
            mode: default_mode(),
            tracked: None,
            symmetry: default_symmetry(),
        }
    }
}

impl SolverConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| TablebaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: SolverConfig = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn geometry(&self) -> BoardGeometry {
        BoardGeometry::new(self.rows, self.cols)
    }

    /// Royal labels with the tracked label first.
    pub fn royal_labels(&self) -> Result<Vec<PieceLabel>> {
        let mut royal = labels(&self.royal, "royal")?;
        if let Some(t) = self.tracked {
            let t = u8::try_from(t)
                .map_err(|_| TablebaseError::invalid(format!("tracked label {t:?} is not ASCII")))?;
            let Some(at) = royal.iter().position(|&l| l == t) else {
                return Err(TablebaseError::invalid(format!(
                    "tracked label '{}' is not a royal piece",
                    t as char
                )));
            };
            royal.swap(0, at);
        }
        Ok(royal)
    }

    pub fn non_royal_labels(&self) -> Result<Vec<PieceLabel>> {
        labels(&self.non_royal, "non-royal")
    }

    pub fn validate(&self) -> Result<()> {
        for (name, edge) in [("rows", self.rows), ("cols", self.cols)] {
            if edge == 0 || edge > MAX_EDGE {
                return Err(TablebaseError::invalid(format!(
                    "{name} must be in 1..={MAX_EDGE}, got {edge}"
                )));
            }
        }
        let royal = self.royal_labels()?;
        if royal.len() != 2 {
            return Err(TablebaseError::invalid(format!(
                "expected exactly 2 royal pieces, got {}",
                royal.len()
            )));
        }
        if self.pieces < 2 {
            return Err(TablebaseError::invalid("pieces must be at least 2"));
        }
        if self.pieces > self.geometry().size() {
            return Err(TablebaseError::invalid(format!(
                "{} pieces do not fit on a {}x{} board",
                self.pieces, self.rows, self.cols
            )));
        }
        let non_royal = self.non_royal_labels()?;
        if non_royal.len() < self.pieces - 2 {
            return Err(TablebaseError::invalid(format!(
                "non-royal pool '{}' is too small for {} pieces",
                self.non_royal, self.pieces
            )));
        }
        if non_royal.iter().any(|l| royal.contains(l)) {
            return Err(TablebaseError::invalid(
                "royal labels cannot appear in the non-royal pool",
            ));
        }
        if self.threads == 0 {
            return Err(TablebaseError::invalid("threads must be at least 1"));
        }
        if let SolverMode::Distributed { workers: 0 } = self.mode {
            return Err(TablebaseError::invalid("workers must be at least 1"));
        }
        Ok(())
    }
}

fn labels(s: &str, what: &str) -> Result<Vec<PieceLabel>> {
    if let Some(bad) = s.chars().find(|c| !c.is_ascii_alphabetic()) {
        return Err(TablebaseError::invalid(format!(
            "{what} piece set '{s}' contains {bad:?}; labels are ASCII letters"
        )));
    }
    Ok(s.bytes().collect())
}
