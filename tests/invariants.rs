use retrograde::board::BoardGeometry;
use retrograde::enumerate::{enumerate_terminal, Configuration};
use retrograde::rules::chess::ChessRules;
use retrograde::rules::Rules;
use retrograde::solve::{probe, retrograde, solve_shared, Outcome};
use retrograde::{Position, Tablebase, TablebaseError};

fn solved(config: &[u8]) -> (ChessRules, Tablebase) {
    let rules = ChessRules::new(BoardGeometry::new(5, 5));
    let config = Configuration::new(config.to_vec());
    let (terminal, _) = enumerate_terminal(&rules, &config, 2, true).unwrap();
    let table = solve_shared(&rules, terminal, 2).unwrap();
    (rules, table)
}

#[test]
fn every_classified_position_has_one_outcome() {
    let (_, table) = solved(b"kKR");
    assert!(table.wins.is_disjoint(&table.losses));
    for p in table.wins.iter().chain(&table.losses) {
        assert!(table.depth(p).is_some());
    }
    assert_eq!(table.depth_to_mate.len(), table.len());
}

#[test]
fn losses_only_move_into_shallower_wins() {
    let (rules, table) = solved(b"kKQ");
    for p in &table.losses {
        let d = table.depth(p).unwrap();
        for s in rules.forward_moves(p) {
            match table.outcome(&s) {
                Some(Outcome::Win(w)) => assert!(w < d),
                other => panic!("loss at {d} has a successor outside the win set: {other:?}"),
            }
        }
    }
}

#[test]
fn wins_have_a_loss_one_ply_closer() {
    let (rules, table) = solved(b"kKQ");
    for p in &table.wins {
        let d = table.depth(p).unwrap();
        assert!(rules
            .forward_moves(p)
            .iter()
            .any(|s| table.outcome(s) == Some(Outcome::Loss(d - 1))));
    }
}

#[test]
fn probe_lines_descend_one_ply_at_a_time() {
    let (rules, table) = solved(b"kKR");
    let mut starts: Vec<_> = table.wins.iter().chain(&table.losses).collect();
    starts.sort_by_key(|p| std::cmp::Reverse(table.depth(p)));
    for start in starts.into_iter().take(25) {
        let line = probe(&rules, &table, start).unwrap();
        assert_eq!(line.positions.len(), line.plies as usize + 1);
        for (i, pair) in line.positions.windows(2).enumerate() {
            assert!(rules.forward_moves(&pair[0]).contains(&pair[1]));
            assert_eq!(table.depth(&pair[1]), Some(line.plies - i as u16 - 1));
        }
        assert!(rules.is_terminal(line.end().unwrap()));
    }
}

#[test]
fn draws_cannot_be_probed() {
    let (rules, table) = solved(b"kKQ");
    let g = *rules.board();
    // Black king captures the undefended queen: only the kings remain.
    let draw = Position::empty(g.size(), true, ())
        .with(0, b'K')
        .with(24, b'k');
    assert!(matches!(
        probe(&rules, &table, &draw),
        Err(TablebaseError::Undetermined)
    ));
}

#[test]
fn rerunning_from_the_terminal_set_is_a_fixpoint() {
    let rules = ChessRules::new(BoardGeometry::new(4, 4));
    let config = Configuration::new(b"kKQ".to_vec());
    let (terminal, _) = enumerate_terminal(&rules, &config, 1, false).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
    let first = pool.install(|| retrograde(&rules, terminal.clone()));
    let second = pool.install(|| retrograde(&rules, terminal));
    assert_eq!(first.depth_to_mate, second.depth_to_mate);
}
