use crate::types::{Depth, Value};

/// 保存された評価値と真のミニマックス値との関係
///
/// 上界・下界は手番に依存しない。下界は「真の値 >= score」、上界は「真の値 <= score」を表す。
/// 静止探索の結果には別のタグを付け、保存する指し手リストが駒取り・成りのみであることを示す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// 窓の内側で確定した値（末端ノードを含む）
    Edge,
    /// 真の値は `score` 以上（fail-high）
    LowerBound,
    /// 真の値は `score` 以下（fail-low）
    UpperBound,
    /// 窓の内側で確定した静止探索の値
    Quiescence,
    /// 静止探索の fail-high
    LowerBoundQuiescence,
    /// 静止探索の fail-low
    UpperBoundQuiescence,
}

impl Bound {
    #[inline]
    pub fn is_quiescence(self) -> bool {
        matches!(
            self,
            Bound::Quiescence | Bound::LowerBoundQuiescence | Bound::UpperBoundQuiescence
        )
    }

    #[inline]
    pub fn is_lower(self) -> bool {
        matches!(self, Bound::LowerBound | Bound::LowerBoundQuiescence)
    }

    #[inline]
    pub fn is_upper(self) -> bool {
        matches!(self, Bound::UpperBound | Bound::UpperBoundQuiescence)
    }

    /// fail-hard の結果 `value` を、探索した窓 `[alpha, beta]` に対する境界種別に分類する
    #[inline]
    pub fn classify(value: Value, alpha: Value, beta: Value) -> Bound {
        if value >= beta {
            Bound::LowerBound
        } else if value <= alpha {
            Bound::UpperBound
        } else {
            Bound::Edge
        }
    }

    /// 同じ関係を静止探索の結果として表す
    #[inline]
    pub fn into_quiescence(self) -> Bound {
        match self {
            Bound::Edge | Bound::Quiescence => Bound::Quiescence,
            Bound::LowerBound | Bound::LowerBoundQuiescence => Bound::LowerBoundQuiescence,
            Bound::UpperBound | Bound::UpperBoundQuiescence => Bound::UpperBoundQuiescence,
        }
    }

    /// `score` だけで窓 `[alpha, beta]` の探索結果が決まるか
    #[inline]
    pub fn settles(self, score: Value, alpha: Value, beta: Value) -> bool {
        if self.is_lower() {
            score >= beta
        } else if self.is_upper() {
            score <= alpha
        } else {
            true
        }
    }

    /// `score` で窓 `[alpha, beta]` を狭められるか（決着はしない）
    #[inline]
    pub fn narrows(self, score: Value, alpha: Value, beta: Value) -> bool {
        (self.is_lower() || self.is_upper()) && alpha < score && score < beta
    }
}

/// キャッシュされた探索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtEntry<M> {
    /// 64bit の Zobrist キー全体（読み出しのたびに比較する）
    pub key: u64,
    /// 探索したときの残り深さ
    pub depth: Depth,
    pub bound: Bound,
    pub score: Value,
    pub best_move: Option<M>,
    /// 手番側から見て良い順に並べた指し手
    pub moves: Option<Vec<M>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i32) -> Value {
        Value::new(x)
    }

    #[test]
    fn test_bound_quiescence_flags() {
        assert!(Bound::Quiescence.is_quiescence());
        assert!(Bound::LowerBoundQuiescence.is_quiescence());
        assert!(Bound::UpperBoundQuiescence.is_quiescence());
        assert!(!Bound::Edge.is_quiescence());
        assert!(!Bound::LowerBound.is_quiescence());

        assert_eq!(Bound::Edge.into_quiescence(), Bound::Quiescence);
        assert_eq!(Bound::LowerBound.into_quiescence(), Bound::LowerBoundQuiescence);
        assert_eq!(Bound::UpperBound.into_quiescence(), Bound::UpperBoundQuiescence);
    }

    #[test]
    fn test_bound_classify() {
        assert_eq!(Bound::classify(v(50), v(-10), v(50)), Bound::LowerBound);
        assert_eq!(Bound::classify(v(-10), v(-10), v(50)), Bound::UpperBound);
        assert_eq!(Bound::classify(v(0), v(-10), v(50)), Bound::Edge);
    }

    #[test]
    fn test_bound_settles_and_narrows() {
        // 下界は beta 以上でのみ決着し、窓の内側なら alpha を引き上げるだけ
        assert!(Bound::LowerBound.settles(v(100), v(0), v(100)));
        assert!(!Bound::LowerBound.settles(v(99), v(0), v(100)));
        assert!(Bound::LowerBound.narrows(v(99), v(0), v(100)));
        assert!(!Bound::LowerBound.narrows(v(0), v(0), v(100)));

        assert!(Bound::UpperBoundQuiescence.settles(v(0), v(0), v(100)));
        assert!(!Bound::UpperBoundQuiescence.settles(v(1), v(0), v(100)));
        assert!(Bound::UpperBoundQuiescence.narrows(v(1), v(0), v(100)));

        assert!(Bound::Edge.settles(v(1000), v(0), v(100)));
        assert!(Bound::Quiescence.settles(v(-1000), v(0), v(100)));
        assert!(!Bound::Edge.narrows(v(50), v(0), v(100)));
    }
}
