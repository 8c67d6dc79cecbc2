//! 探索のテスト
//!
//! - `alpha_beta`: 枝刈りした探索と枝刈りなしの参照実装の比較
//! - `quiescence`: stand-pat と駒取りの解消
//! - `cancellation`: 期限の扱いと置換表からの答え
//! - `driver`: 反復深化のシナリオ

mod quiescence;

use chess::{Board, ChessMove};

use crate::config::SearchConfig;
use crate::eval::{EvalConfig, Evaluator};
use crate::rules::{ChessRules, Rules};
use crate::search::Searcher;
use crate::types::{Depth, Value};

pub(super) fn material_config() -> SearchConfig {
    SearchConfig {
        eval: EvalConfig { positional: false },
        tt_slots: 1 << 14,
        ..SearchConfig::default()
    }
}

pub(super) fn searcher(config: SearchConfig) -> Searcher<ChessRules> {
    Searcher::new(ChessRules::new(), config).unwrap()
}

pub(super) fn board(fen: &str) -> Board {
    ChessRules::new().parse_fen(fen).unwrap()
}

pub(super) fn mv(pos: &Board, text: &str) -> ChessMove {
    ChessRules::new().parse_move(pos, text).unwrap()
}

/// 枝刈り・置換表・静止探索なしの全幅ミニマックス
pub(super) fn reference_minimax(
    rules: &ChessRules,
    evaluator: &Evaluator,
    pos: &Board,
    depth: Depth,
    maximizing: bool,
    prior: Value,
) -> Value {
    if depth <= 0 || rules.outcome(pos).is_terminal() {
        return prior;
    }
    let moves = rules.legal_moves(pos);
    if moves.is_empty() {
        return prior;
    }
    let values = moves.into_iter().map(|m| {
        let child = rules.apply_move(pos, m);
        let child_prior = evaluator.evaluate(rules, prior, pos, &child, m, maximizing);
        reference_minimax(rules, evaluator, &child, depth - 1, !maximizing, child_prior)
    });
    if maximizing { values.max().unwrap() } else { values.min().unwrap() }
}
