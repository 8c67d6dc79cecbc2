use super::*;
use crate::search::LineEntry;
use crate::tt::Bound;

const INF: Value = Value::INFINITE;

#[test]
fn test_quiet_position_stands_pat() {
    let pos = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    let mut s = searcher(SearchConfig::default());
    let prior = Value::new(37);
    let result = s.search(&pos, 0, -INF, INF, true, prior);

    assert_eq!(result.value, prior);
    assert_eq!(result.best_move, None);
    assert_eq!(result.line.get(0), Some(LineEntry::Edge));
}

#[test]
fn test_free_capture_is_taken() {
    let rules = ChessRules::new();
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let capture = mv(&pos, "e4d5");
    let after = rules.apply_move(&pos, capture);
    let mut s = searcher(SearchConfig::default());
    let expected = s.evaluator().evaluate(&rules, Value::ZERO, &pos, &after, capture, true);

    let result = s.search(&pos, 0, -INF, INF, true, Value::ZERO);
    assert_eq!(result.best_move, Some(capture));
    assert_eq!(result.value, expected);
    assert_eq!(result.line.get(0), Some(LineEntry::Quiescence(capture)));
    assert_eq!(result.line.get(1), Some(LineEntry::Edge));
}

#[test]
fn test_defended_pawn_is_not_taken() {
    // Qxd5 はポーンを取るが cxd5 でクイーンを失う
    let pos = board("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let result = s.search(&pos, 0, -INF, INF, true, Value::ZERO);

    assert_eq!(result.best_move, None);
    assert_eq!(result.value, Value::ZERO);
}

#[test]
fn test_quiescence_converges() {
    let rules = ChessRules::new();
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let result = s.search(&pos, 0, -INF, INF, true, Value::ZERO);

    // 駒取りの読み筋を再生し、静かな末端局面が同じ値で stand-pat することを確かめる
    let mut end = pos;
    let mut maximizing = true;
    let mut prior = Value::ZERO;
    for m in result.line.moves() {
        let next = rules.apply_move(&end, m);
        prior = s.evaluator().evaluate(&rules, prior, &end, &next, m, maximizing);
        end = next;
        maximizing = !maximizing;
    }
    assert_eq!(prior, result.value);

    let mut fresh = searcher(SearchConfig::default());
    let again = fresh.search(&end, 0, -INF, INF, maximizing, prior);
    assert_eq!(again.value, result.value);
    assert_eq!(again.best_move, None);
}

#[test]
fn test_floor_zero_disables_quiescence() {
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let mut s = searcher(SearchConfig { quiescence_floor: 0, ..SearchConfig::default() });
    let result = s.search(&pos, 0, -INF, INF, true, Value::new(5));

    assert_eq!(result.value, Value::new(5));
    assert_eq!(result.best_move, None);
    assert_eq!(s.stats().nodes, 1);
}

#[test]
fn test_quiescence_result_is_cached() {
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let first = s.search(&pos, 0, -INF, INF, true, Value::ZERO);
    s.reset_stats();
    let second = s.search(&pos, 0, -INF, INF, true, Value::ZERO);

    assert_eq!(first.value, second.value);
    assert_eq!(s.stats().tt_hits_quiescence, 1);
    assert_eq!(s.stats().nodes, 1);
}

#[test]
fn test_stand_pat_cutoff_is_not_cached_as_exact() {
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let full = searcher(SearchConfig::default()).search(&pos, 0, -INF, INF, true, Value::ZERO);
    assert!(full.value > Value::new(800), "{}", full.value);

    // stand-pat の 0 が beta を超えるので、駒取りを読まずに beta を返す
    let cut = s.search(&pos, 0, Value::new(-100), Value::new(-50), true, Value::ZERO);
    assert_eq!(cut.value, Value::new(-50));
    assert_eq!(cut.best_move, None);
    assert!(s.tt().is_empty());

    let again = s.search(&pos, 0, -INF, INF, true, Value::ZERO);
    assert_eq!(again.value, full.value);
    assert_eq!(again.best_move, full.best_move);
}

#[test]
fn test_fail_high_in_quiescence_stores_lower_bound() {
    let pos = board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let high = s.search(&pos, 0, Value::new(100), Value::new(200), true, Value::ZERO);
    assert_eq!(high.value, Value::new(200));

    let key = s.zobrist().key(s.rules(), &pos);
    let entry = s.tt().get(key).unwrap();
    assert_eq!(entry.bound, Bound::LowerBoundQuiescence);

    let full = s.search(&pos, 0, -INF, INF, true, Value::ZERO);
    assert!(full.value > Value::new(800), "{}", full.value);
    assert_eq!(full.best_move, Some(mv(&pos, "e4d5")));
}

#[test]
fn test_fail_low_in_quiescence_stores_upper_bound() {
    let pos = board("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1");
    let mut s = searcher(SearchConfig::default());
    let low = s.search(&pos, 0, Value::new(100), Value::new(200), true, Value::ZERO);
    assert_eq!(low.value, Value::new(100));

    let key = s.zobrist().key(s.rules(), &pos);
    let entry = s.tt().get(key).unwrap();
    assert_eq!((entry.bound, entry.score), (Bound::UpperBoundQuiescence, Value::new(100)));

    // 上界 100 は全幅の窓では beta を狭めるだけ
    s.reset_stats();
    let full = s.search(&pos, 0, -INF, INF, true, Value::ZERO);
    assert_eq!(full.value, Value::ZERO);
    assert_eq!(full.best_move, None);
    assert_eq!(s.stats().tt_narrowed, 1);
    assert_eq!(s.tt().get(key).map(|e| e.bound), Some(Bound::Edge));
}
