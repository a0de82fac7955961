use retrograde::board::BoardGeometry;
use retrograde::enumerate::permutations::scan_range;
use retrograde::enumerate::{configurations, enumerate_terminal, Configuration};
use retrograde::partition::Partitioner;
use retrograde::rules::chess::ChessRules;

#[test]
fn partitions_split_placements_exactly() {
    let rules = ChessRules::standard();
    let config = Configuration::new(b"kKr".to_vec());
    let p = Partitioner::new(b'k', 64, 2).unwrap();

    let (first, a) = scan_range(&rules, &config, p.range(0));
    let (second, b) = scan_range(&rules, &config, p.range(1));
    assert_eq!(a.placements + b.placements, 249_984);
    assert!(first.is_disjoint(&second));
    assert!(first.iter().all(|pos| p.owner(pos) == 0));
    assert!(second.iter().all(|pos| p.owner(pos) == 1));

    let (all, _) = enumerate_terminal(&rules, &config, 3, false).unwrap();
    assert_eq!(all.len(), first.len() + second.len());
}

#[test]
fn sharding_does_not_change_the_terminal_set() {
    let rules = ChessRules::new(BoardGeometry::new(5, 5));
    let config = Configuration::new(b"kKR".to_vec());
    let (one, s1) = enumerate_terminal(&rules, &config, 1, false).unwrap();
    let (many, s7) = enumerate_terminal(&rules, &config, 7, false).unwrap();
    assert_eq!(one, many);
    assert_eq!(s1, s7);
}

#[test]
fn symmetric_reduction_matches_full_scan_on_odd_boards() {
    for (rows, cols) in [(5, 5), (4, 5), (3, 6)] {
        let rules = ChessRules::new(BoardGeometry::new(rows, cols));
        let config = Configuration::new(b"kKR".to_vec());
        let (full, _) = enumerate_terminal(&rules, &config, 2, false).unwrap();
        let (reduced, _) = enumerate_terminal(&rules, &config, 2, true).unwrap();
        assert!(!full.is_empty());
        assert_eq!(full, reduced, "{rows}x{cols}");
    }
}

#[test]
fn repeated_tracked_label_disables_reduction() {
    let rules = ChessRules::new(BoardGeometry::new(4, 4));
    let config = Configuration::new(b"RRk".to_vec());
    let (_, stats) = enumerate_terminal(&rules, &config, 1, true).unwrap();
    // C(16, 2) rook pairs times 14 king squares
    assert_eq!(stats.placements, 120 * 14);
}

#[test]
fn color_mirrors_are_generated_once() {
    let configs = configurations(b"kK", b"qQrR", 4).unwrap();
    let names: Vec<String> = configs.iter().map(|c| c.to_string()).collect();
    assert_eq!(names, vec!["kKqQ", "kKqr", "kKqR", "kKrR"]);
}

#[test]
fn mirrored_pairs_collapse() {
    let configs = configurations(b"kK", b"qrQR", 4).unwrap();
    let names: Vec<String> = configs.iter().map(|c| c.to_string()).collect();
    // qr/QR and qR/Qr are color mirrors of each other.
    assert_eq!(names, vec!["kKqr", "kKqQ", "kKqR", "kKrR"]);
    assert_eq!(configurations(b"kK", b"qR", 4).unwrap().len(), 1);
}
