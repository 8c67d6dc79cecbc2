use super::entry::{Bound, TtEntry};
use crate::types::{Depth, Value};

/// 置換表の読み出し結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtRead<M> {
    /// 使えるものなし（空きスロット、衝突、浅すぎる評価値のみのエントリ）
    Miss,
    /// 同じか深い探索の結果で、呼び出し側の窓に対して値が確定する
    Deeper { score: Value, best_move: Option<M>, depth: Depth, bound: Bound },
    /// 静止探索の結果で、呼び出し側の窓に対して値が確定する
    QuiescenceDeeper { score: Value, best_move: Option<M>, depth: Depth, bound: Bound },
    /// 深さは足りるが、境界値は窓を狭めるだけ（下界なら alpha、上界なら beta を `score` に）
    Narrowed { score: Value, bound: Bound, depth: Depth, moves: Option<Vec<M>> },
    /// 評価値は使えないが、通常探索で並べた指し手リストは使える
    SavedMoves { moves: Vec<M>, depth: Depth },
    /// 評価値は使えないが、静止探索の指し手リストは使える
    QuiescenceSavedMoves { moves: Vec<M>, depth: Depth },
}

/// テーブル全体のカウンタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtCounters {
    pub writes: u64,
    /// 別キーのエントリを置き換えた書き込み
    pub overwrites: u64,
    /// スロットに別キーが入っていた読み出し
    pub collisions: u64,
}

/// 置換表
///
/// キーの上位ビットで引く固定長のスロット配列。書き込みは常に上書きで、
/// 深さ優先の置換は行わない。
pub struct TranspositionTable<M> {
    slots: Vec<Option<TtEntry<M>>>,
    used: usize,
    counters: TtCounters,
}

impl<M: Copy> TranspositionTable<M> {
    /// `slots` 個（最低1個）のスロットで作成
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        Self {
            slots: vec![None; slots],
            used: 0,
            counters: TtCounters::default(),
        }
    }

    /// スロット数
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 使用中のスロット数
    #[inline]
    pub fn len(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn counters(&self) -> TtCounters {
        self.counters
    }

    /// 全エントリを破棄
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.used = 0;
        self.counters = TtCounters::default();
    }

    /// 使用率（千分率）
    pub fn hashfull(&self) -> u32 {
        ((self.used as u64 * 1000) / self.slots.len() as u64) as u32
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        // key * slots / 2^64
        ((key as u128 * self.slots.len() as u128) >> 64) as usize
    }

    /// 結果を保存する（スロットの中身は常に置き換える）
    pub fn write(
        &mut self,
        key: u64,
        depth: Depth,
        bound: Bound,
        score: Value,
        best_move: Option<M>,
        moves: Option<Vec<M>>,
    ) {
        let idx = self.index(key);
        let slot = &mut self.slots[idx];
        match slot {
            None => self.used += 1,
            Some(old) if old.key != key => self.counters.overwrites += 1,
            Some(_) => {}
        }
        *slot = Some(TtEntry {
            key,
            depth,
            bound,
            score,
            best_move,
            moves,
        });
        self.counters.writes += 1;
    }

    /// 残り `depth` 手、窓 `[alpha, beta]` の探索のために `key` を引く
    ///
    /// 深さが足りるとき、確定値か窓の外側の境界値なら `Deeper` / `QuiescenceDeeper`、
    /// 窓の内側の境界値なら `Narrowed` を返す。それ以外は指し手リストだけを返す。
    pub fn read(&mut self, key: u64, depth: Depth, alpha: Value, beta: Value) -> TtRead<M> {
        let idx = self.index(key);
        let Some(entry) = &self.slots[idx] else {
            return TtRead::Miss;
        };
        if entry.key != key {
            self.counters.collisions += 1;
            log::debug!(
                "tt collision at slot {idx}: requested {key:#018x}, stored {:#018x}",
                entry.key
            );
            return TtRead::Miss;
        }

        let (score, bound) = (entry.score, entry.bound);
        if entry.depth >= depth {
            if bound.settles(score, alpha, beta) {
                let (best_move, depth) = (entry.best_move, entry.depth);
                return if bound.is_quiescence() {
                    TtRead::QuiescenceDeeper { score, best_move, depth, bound }
                } else {
                    TtRead::Deeper { score, best_move, depth, bound }
                };
            }
            if bound.narrows(score, alpha, beta) {
                return TtRead::Narrowed {
                    score,
                    bound,
                    depth: entry.depth,
                    moves: entry.moves.clone(),
                };
            }
        }

        match &entry.moves {
            Some(moves) if bound.is_quiescence() => TtRead::QuiescenceSavedMoves {
                moves: moves.clone(),
                depth: entry.depth,
            },
            Some(moves) => TtRead::SavedMoves {
                moves: moves.clone(),
                depth: entry.depth,
            },
            None => TtRead::Miss,
        }
    }

    /// `key` と完全一致するエントリ
    pub fn get(&self, key: u64) -> Option<&TtEntry<M>> {
        self.slots[self.index(key)].as_ref().filter(|e| e.key == key)
    }
}
