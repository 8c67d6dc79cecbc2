//! 指し手オーダリングと静止探索のフィルタ
//!
//! どちらもどの枝が刈られるかに影響するだけで、全幅の窓での探索値は変えない。
//! 安定ソートなので、同点の手は生成順のままで結果は再現できる。

use smallvec::SmallVec;

use crate::eval::{piece_value, pst};
use crate::rules::{MoveInfo, Outcome, Rules};
use crate::types::Side;

/// 成りを最優先にする固定ボーナス
pub const PROMOTION_BONUS: i32 = 2000;
/// 静かな王手への小さなボーナス
pub const CHECK_BONUS: i32 = 10;

type Scored<M> = SmallVec<[(i32, M); 64]>;

/// [`MoveOrderer::order`] が使う経験的なスコア
pub fn order_score(info: &MoveInfo, mover: Side) -> i32 {
    let mut score = 0;
    if info.is_promotion() {
        score += PROMOTION_BONUS;
    }
    if let Some(captured) = info.captured {
        score += piece_value(captured) - piece_value(info.piece);
    } else if info.gives_check {
        score += CHECK_BONUS;
    }
    score + pst::delta(info.piece, mover, info.from, info.to)
}

/// [`MoveOrderer::quiescence_filter`] が使う駒交換のスコア
#[inline]
pub fn exchange_score(info: &MoveInfo) -> i32 {
    info.captured.map_or(0, piece_value) - piece_value(info.piece)
}

fn sorted_desc<M: Copy>(mut scored: Scored<M>) -> Vec<M> {
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

/// 指し手オーダリングと静止探索のフィルタ
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOrderer {
    include_mating_checks: bool,
}

impl MoveOrderer {
    pub fn new(include_mating_checks: bool) -> Self {
        Self {
            include_mating_checks,
        }
    }

    /// [`order_score`] で `moves` を良い順に並べる
    pub fn order<R: Rules>(&self, rules: &R, pos: &R::Position, moves: &[R::Move]) -> Vec<R::Move> {
        let mover = rules.side_to_move(pos);
        let scored: Scored<R::Move> = moves
            .iter()
            .map(|&mv| (order_score(&rules.move_info(pos, mv), mover), mv))
            .collect();
        sorted_desc(scored)
    }

    /// 駒取りと成り（有効なら詰みの王手も）だけを残し、駒交換の良い順に並べる
    pub fn quiescence_filter<R: Rules>(
        &self,
        rules: &R,
        pos: &R::Position,
        moves: &[R::Move],
    ) -> Vec<R::Move> {
        let scored: Scored<R::Move> = moves
            .iter()
            .filter_map(|&mv| {
                let info = rules.move_info(pos, mv);
                let keep = info.is_noisy()
                    || (self.include_mating_checks
                        && info.gives_check
                        && matches!(rules.outcome(&rules.apply_move(pos, mv)), Outcome::Win(_)));
                keep.then(|| (exchange_score(&info), mv))
            })
            .collect();
        sorted_desc(scored)
    }
}
