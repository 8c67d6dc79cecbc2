//! 最善読み筋の記録
//!
//! `SearchHistory` はルートからの ply ごとに1スロットを持つ。各ノードは最善の子が返した
//! 読み筋に自分のスロットを書き足すので、最後にはルートが読み筋全体を持つ。

use std::fmt;

use smallvec::SmallVec;

/// その ply の手をどうやって得たか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEntry<M> {
    /// 通常のαβループで選んだ
    Searched(M),
    /// 静止探索の中で選んだ
    Quiescence(M),
    /// 置換表のヒットから取った
    Cached(M),
    /// 読み筋はここで差分評価値で終わった
    Edge,
}

impl<M: Copy> LineEntry<M> {
    pub fn mv(&self) -> Option<M> {
        match *self {
            LineEntry::Searched(m) | LineEntry::Quiescence(m) | LineEntry::Cached(m) => Some(m),
            LineEntry::Edge => None,
        }
    }
}

/// ply で引く固定容量の最善読み筋
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory<M> {
    slots: SmallVec<[Option<LineEntry<M>>; 64]>,
}

impl<M: Copy> SearchHistory<M> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: smallvec::smallvec![None; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `ply` に `entry` を記録する。範囲外の ply は無視
    #[inline]
    pub fn record(&mut self, ply: usize, entry: LineEntry<M>) {
        if let Some(slot) = self.slots.get_mut(ply) {
            *slot = Some(entry);
        }
    }

    #[inline]
    pub fn get(&self, ply: usize) -> Option<LineEntry<M>> {
        self.slots.get(ply).copied().flatten()
    }

    /// ルートからの読み筋の指し手（最初の空きか末端まで）
    pub fn moves(&self) -> Vec<M> {
        self.slots.iter().map_while(|slot| slot.and_then(|e| e.mv())).collect()
    }

    /// 記録済みのスロット数
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl<M: Copy + fmt::Display> fmt::Display for SearchHistory<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in self.slots.iter().flatten() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match entry {
                LineEntry::Searched(m) => write!(f, "{m}")?,
                LineEntry::Quiescence(m) => write!(f, "{m}(q)")?,
                LineEntry::Cached(m) => write!(f, "{m}(tt)")?,
                LineEntry::Edge => f.write_str("|")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_record_and_moves() {
        let mut h: SearchHistory<u8> = SearchHistory::new(8);
        assert!(h.is_empty());
        h.record(0, LineEntry::Searched(1));
        h.record(1, LineEntry::Cached(2));
        h.record(2, LineEntry::Quiescence(3));
        h.record(3, LineEntry::Edge);
        h.record(4, LineEntry::Searched(9));

        assert_eq!(h.moves(), vec![1, 2, 3]);
        assert_eq!(h.len(), 5);
        assert_eq!(h.get(1), Some(LineEntry::Cached(2)));
        assert_eq!(h.get(7), None);
        assert_eq!(h.to_string(), "1 2(tt) 3(q) | 9");
    }

    #[test]
    fn test_history_capacity_is_fixed() {
        let mut h: SearchHistory<u8> = SearchHistory::new(2);
        h.record(5, LineEntry::Searched(1));
        assert!(h.is_empty());
        assert_eq!(h.capacity(), 2);
    }
}
