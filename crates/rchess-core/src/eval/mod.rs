//! 局面の差分評価
//!
//! 評価値は最大化側から見た値。差分評価値は対局ごとに1回 [`Evaluator::static_eval`] で
//! 初期化し、以後は [`Evaluator::evaluate`] で1手ずつ引き継ぐ。探索中に全計算し直すことはない。

pub mod pst;

use serde::Deserialize;

use crate::rules::{MoveInfo, Outcome, Rules};
use crate::types::{PieceKind, Side, Value};

/// 駒種の駒割り
#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20000,
    }
}

/// 評価関数の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// 駒位置評価の差分を含める。false なら駒割りのみ
    pub positional: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { positional: true }
    }
}

/// 差分評価関数
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// 駒割りだけの評価関数
    pub fn material_only() -> Self {
        Self::new(EvalConfig { positional: false })
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// `before` で `mv` を指して `after` になった後の評価値
    ///
    /// `mover_maximizing` は `mv` を指した側が最大化側かどうか。
    /// 詰みなら指した側の符号付き `MATE`、引き分けなら `DRAW`。それ以外は指した側の駒割りと
    /// 位置評価の増分を `prior` に足す（または引く）。
    pub fn evaluate<R: Rules>(
        &self,
        rules: &R,
        prior: Value,
        before: &R::Position,
        after: &R::Position,
        mv: R::Move,
        mover_maximizing: bool,
    ) -> Value {
        let sign = if mover_maximizing { 1 } else { -1 };
        match rules.outcome(after) {
            Outcome::Win(_) => Value::MATE * sign,
            Outcome::Draw => Value::DRAW,
            Outcome::Ongoing => {
                let info = rules.move_info(before, mv);
                let mover = rules.side_to_move(before);
                prior + Value::new(sign * self.move_gain(&info, mover))
            }
        }
    }

    /// 1手による駒割りと位置評価の増分（指した側から見た値）
    pub fn move_gain(&self, info: &MoveInfo, mover: Side) -> i32 {
        let mut gain = info.captured.map_or(0, piece_value);
        let landed = info.promotion.unwrap_or(info.piece);
        if let Some(promo) = info.promotion {
            gain += piece_value(promo) - piece_value(PieceKind::Pawn);
        }
        if self.config.positional {
            gain += pst::square_value(landed, mover, info.to)
                - pst::square_value(info.piece, mover, info.from);
        }
        gain
    }

    /// `maximizer` から見た `pos` の絶対評価。差分評価値の初期化に使う
    pub fn static_eval<R: Rules>(&self, rules: &R, pos: &R::Position, maximizer: Side) -> Value {
        match rules.outcome(pos) {
            Outcome::Win(side) if side == maximizer => return Value::MATE,
            Outcome::Win(_) => return -Value::MATE,
            Outcome::Draw => return Value::DRAW,
            Outcome::Ongoing => {}
        }
        let total = rules.pieces(pos).into_iter().fold(0, |acc, (piece, sq)| {
            let mut v = piece_value(piece.kind);
            if self.config.positional {
                v += pst::square_value(piece.kind, piece.side, sq);
            }
            if piece.side == maximizer { acc + v } else { acc - v }
        });
        Value::new(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ChessRules;

    fn play(rules: &ChessRules, fen: &str, mv: &str) -> (chess::Board, chess::Board, chess::ChessMove) {
        let before = rules.parse_fen(fen).unwrap();
        let mv = rules.parse_move(&before, mv).unwrap();
        (before, rules.apply_move(&before, mv), mv)
    }

    #[test]
    fn test_static_eval_startpos_is_balanced() {
        let rules = ChessRules::new();
        let pos = rules.startpos();
        assert_eq!(Evaluator::default().static_eval(&rules, &pos, Side::White), Value::ZERO);
        assert_eq!(Evaluator::default().static_eval(&rules, &pos, Side::Black), Value::ZERO);
    }

    #[test]
    fn test_evaluate_capture_adds_material_for_maximizer() {
        let rules = ChessRules::new();
        let ev = Evaluator::material_only();
        // 白ビショップが守りのない黒クイーンを取る
        let (before, after, mv) = play(&rules, "4k3/p7/8/3q4/8/8/6B1/4K3 w - - 0 1", "g2d5");
        let v = ev.evaluate(&rules, Value::new(10), &before, &after, mv, true);
        assert_eq!(v, Value::new(910));

        let v = ev.evaluate(&rules, Value::new(10), &before, &after, mv, false);
        assert_eq!(v, Value::new(-890));
    }

    #[test]
    fn test_evaluate_checkmate_and_draw() {
        let rules = ChessRules::new();
        let ev = Evaluator::default();
        // バックランクメイト
        let (before, after, mv) = play(&rules, "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8");
        assert_eq!(ev.evaluate(&rules, Value::new(123), &before, &after, mv, true), Value::MATE);
        assert_eq!(ev.evaluate(&rules, Value::new(123), &before, &after, mv, false), -Value::MATE);

        // ステイルメイトになるクイーンの手
        let (before, after, mv) = play(&rules, "7k/8/6K1/8/8/8/5Q2/8 w - - 0 1", "f2f7");
        assert_eq!(ev.evaluate(&rules, Value::new(900), &before, &after, mv, true), Value::DRAW);
    }

    #[test]
    fn test_evaluate_quiet_move_matches_static_delta() {
        let rules = ChessRules::new();
        let ev = Evaluator::default();
        let start = rules.startpos();
        for mv in rules.legal_moves(&start) {
            let after = rules.apply_move(&start, mv);
            let incremental = ev.evaluate(&rules, Value::ZERO, &start, &after, mv, true);
            let recomputed = ev.static_eval(&rules, &after, Side::White);
            assert_eq!(incremental, recomputed, "move {mv}");
        }
    }

    #[test]
    fn test_evaluate_promotion_gain() {
        let rules = ChessRules::new();
        let ev = Evaluator::material_only();
        let (before, after, mv) = play(&rules, "8/P6k/8/8/8/8/8/K7 w - - 0 1", "a7a8q");
        let v = ev.evaluate(&rules, Value::ZERO, &before, &after, mv, true);
        assert_eq!(v, Value::new(800));
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(piece_value(PieceKind::Queen), 900);
        assert!(piece_value(PieceKind::Bishop) > piece_value(PieceKind::Knight));
        assert_eq!(piece_value(PieceKind::King), 20000);
    }
}
