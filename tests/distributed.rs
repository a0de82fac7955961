use retrograde::board::BoardGeometry;
use retrograde::enumerate::{enumerate_terminal, Configuration};
use retrograde::partition::Partitioner;
use retrograde::rules::chess::ChessRules;
use retrograde::rules::Rules;
use retrograde::solve::{solve_distributed, solve_distributed_from_terminal, solve_shared};
use retrograde::Tablebase;

fn assert_same(a: &Tablebase, b: &Tablebase) {
    assert_eq!(a.wins, b.wins);
    assert_eq!(a.losses, b.losses);
    assert_eq!(a.depth_to_mate, b.depth_to_mate);
}

#[test]
fn distributed_matches_shared_memory() {
    for config in [&b"kKQ"[..], b"kKR", b"kKq"] {
        let rules = ChessRules::new(BoardGeometry::new(5, 5));
        let config = Configuration::new(config.to_vec());
        let (terminal, _) = enumerate_terminal(&rules, &config, 2, true).unwrap();
        let shared = solve_shared(&rules, terminal, 2).unwrap();
        assert!(!shared.wins.is_empty());

        for workers in [1, 2, 4, 7] {
            let p = Partitioner::new(b'k', rules.board().size(), workers).unwrap();
            let (dist, _) = solve_distributed(&rules, &config, &p).unwrap();
            assert_same(&shared, &dist);
        }
    }
}

#[test]
fn more_workers_than_squares() {
    let rules = ChessRules::new(BoardGeometry::new(4, 4));
    let config = Configuration::new(b"kKR".to_vec());
    let (terminal, _) = enumerate_terminal(&rules, &config, 1, false).unwrap();
    let shared = solve_shared(&rules, terminal.clone(), 1).unwrap();

    let p = Partitioner::new(b'k', 16, 20).unwrap();
    let dist = solve_distributed_from_terminal(&rules, terminal, &p).unwrap();
    assert_same(&shared, &dist);
}

#[test]
fn per_worker_enumeration_sees_every_placement() {
    let rules = ChessRules::new(BoardGeometry::new(4, 5));
    let config = Configuration::new(b"kKQ".to_vec());
    let p = Partitioner::new(b'k', 20, 3).unwrap();
    let (_, stats) = solve_distributed(&rules, &config, &p).unwrap();
    assert_eq!(stats.placements, 20 * 19 * 18);
}

#[test]
fn solving_twice_reaches_the_same_fixpoint() {
    let rules = ChessRules::new(BoardGeometry::new(5, 5));
    let config = Configuration::new(b"kKQ".to_vec());
    let p = Partitioner::new(b'k', 25, 3).unwrap();
    let (a, _) = solve_distributed(&rules, &config, &p).unwrap();
    let (b, _) = solve_distributed(&rules, &config, &p).unwrap();
    assert_same(&a, &b);
}
