use rustc_hash::FxHashSet;

use crate::enumerate::Configuration;
use crate::error::{Result, TablebaseError};
use crate::pieces::{swap_color, PieceLabel};

/// All material configurations of `pieces` pieces: both royal pieces plus every
/// `(pieces - 2)`-subset of `non_royal`, with color-mirrored duplicates removed.
///
/// Subsets are visited in lexicographic index order. A subset is skipped when its sorted
/// label signature, or the signature of its color-swapped mirror, has already been emitted,
/// so `kKqr` and `kKQR` yield one configuration but `kKqR` is kept alongside `kKqr`.
pub fn configurations(
    royal: &[PieceLabel],
    non_royal: &[PieceLabel],
    pieces: usize,
) -> Result<Vec<Configuration>> {
    if royal.len() != 2 {
        return Err(TablebaseError::invalid(format!(
            "expected exactly 2 royal pieces, got {}",
            royal.len()
        )));
    }
    if pieces < 2 {
        return Err(TablebaseError::invalid(format!(
            "piece count {pieces} cannot hold both royal pieces"
        )));
    }
    let extra = pieces - 2;
    if non_royal.len() < extra {
        return Err(TablebaseError::invalid(format!(
            "non-royal pool of {} pieces is too small for {pieces}-piece configurations",
            non_royal.len()
        )));
    }

    let mut visited: FxHashSet<Vec<PieceLabel>> = FxHashSet::default();
    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..extra).collect();

    loop {
        let chosen: Vec<PieceLabel> = idx.iter().map(|&i| non_royal[i]).collect();

        let mut signature = chosen.clone();
        signature.sort_unstable();
        let mut mirrored: Vec<PieceLabel> = chosen.iter().map(|&l| swap_color(l)).collect();
        mirrored.sort_unstable();

        if !visited.contains(&signature) && !visited.contains(&mirrored) {
            visited.insert(signature);
            let mut labels = royal.to_vec();
            labels.extend_from_slice(&chosen);
            out.push(Configuration::new(labels));
        }

        if !next_combination(&mut idx, non_royal.len()) {
            break;
        }
    }

    Ok(out)
}

/// Advances `idx` to the next k-combination of `0..n` in lexicographic order.
fn next_combination(idx: &mut [usize], n: usize) -> bool {
    let k = idx.len();
    let Some(i) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
        return false;
    };
    idx[i] += 1;
    for j in i + 1..k {
        idx[j] = idx[j - 1] + 1;
    }
    true
}
