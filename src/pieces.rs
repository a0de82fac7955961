//! Piece labels.
//!
//! A label is an ASCII byte: uppercase belongs to the first player, lowercase to the
//! second. `EMPTY` marks a vacant square.

pub type PieceLabel = u8;

pub const EMPTY: PieceLabel = 0;

#[inline]
pub fn is_empty(label: PieceLabel) -> bool {
    label == EMPTY
}

/// True for first-player labels.
#[inline]
pub fn is_first_player(label: PieceLabel) -> bool {
    label.is_ascii_uppercase()
}

/// True if the label belongs to the side given by a side-to-move flag.
#[inline]
pub fn belongs_to(label: PieceLabel, first_player: bool) -> bool {
    !is_empty(label) && is_first_player(label) == first_player
}

/// The same piece in the other color.
#[inline]
pub fn swap_color(label: PieceLabel) -> PieceLabel {
    if label.is_ascii_uppercase() {
        label.to_ascii_lowercase()
    } else {
        label.to_ascii_uppercase()
    }
}

/// Renders labels back into a string, `.` for empty squares.
pub fn render_labels(labels: &[PieceLabel]) -> String {
    labels
        .iter()
        .map(|&l| if is_empty(l) { '.' } else { l as char })
        .collect()
}

/// A group of identical labels inside a configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGroup {
    pub label: PieceLabel,
    pub count: usize,
}

/// Groups identical labels, keeping the order of first appearance.
///
/// The first group is always the group of `labels[0]`, which is how the tracked piece
/// ends up being placed first by the enumerator.
pub fn group_labels(labels: &[PieceLabel]) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    for &l in labels {
        match groups.iter_mut().find(|g| g.label == l) {
            Some(g) => g.count += 1,
            None => groups.push(LabelGroup { label: l, count: 1 }),
        }
    }
    groups
}
