//! 探索統計
//!
//! カウンタは観測専用で、探索側から読み返すことはない。

use crate::tt::Bound;

/// 探索ごとのカウンタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// 探索呼び出し数（通常探索と静止探索）
    pub nodes: u64,
    /// 残り深さ0以下での呼び出し数
    pub quiescence_nodes: u64,
    /// ルートからの ply ごとの呼び出し数
    pub nodes_by_ply: Vec<u64>,
    pub tt_reads: u64,
    /// ノードを打ち切った通常探索の結果（境界種別ごと）
    pub tt_hits_edge: u64,
    pub tt_hits_lower: u64,
    pub tt_hits_upper: u64,
    /// ノードを打ち切った静止探索の結果
    pub tt_hits_quiescence: u64,
    /// 窓を狭めただけの読み出し
    pub tt_narrowed: u64,
    /// 指し手リストだけが得られた読み出し
    pub tt_move_hints: u64,
    pub tt_writes: u64,
    /// 期限切れ後に置換表から答えたノード
    pub cancelled_hits: u64,
    /// 期限切れ後に unreliable を返したノード
    pub cancelled_nodes: u64,
    /// αβカット数
    pub cutoffs: u64,
}

impl SearchStats {
    pub fn new(max_ply: usize) -> Self {
        Self {
            nodes_by_ply: vec![0; max_ply],
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        let plies = self.nodes_by_ply.len();
        *self = Self::new(plies);
    }

    #[inline]
    pub fn record_node(&mut self, ply: usize, quiescence: bool) {
        self.nodes += 1;
        if quiescence {
            self.quiescence_nodes += 1;
        }
        if let Some(n) = self.nodes_by_ply.get_mut(ply) {
            *n += 1;
        }
    }

    #[inline]
    pub fn record_hit(&mut self, bound: Bound) {
        match bound {
            Bound::Edge => self.tt_hits_edge += 1,
            Bound::LowerBound => self.tt_hits_lower += 1,
            Bound::UpperBound => self.tt_hits_upper += 1,
            Bound::Quiescence | Bound::LowerBoundQuiescence | Bound::UpperBoundQuiescence => {
                self.tt_hits_quiescence += 1
            }
        }
    }

    pub fn tt_hits(&self) -> u64 {
        self.tt_hits_edge + self.tt_hits_lower + self.tt_hits_upper + self.tt_hits_quiescence
    }

    /// ノードを1つ以上探索した最深の ply
    pub fn max_ply_reached(&self) -> usize {
        self.nodes_by_ply.iter().rposition(|&n| n > 0).unwrap_or(0)
    }

    /// debug ログ用の複数行レポート
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("Nodes searched:      {:>12}\n", self.nodes));
        report.push_str(&format!("Quiescence nodes:    {:>12}\n", self.quiescence_nodes));
        report.push_str(&format!("Cutoffs:             {:>12}\n", self.cutoffs));
        report.push_str(&format!("TT reads:            {:>12}\n", self.tt_reads));
        report.push_str(&format!(
            "TT hits:             {:>12} (edge {}, lower {}, upper {}, quiescence {})\n",
            self.tt_hits(),
            self.tt_hits_edge,
            self.tt_hits_lower,
            self.tt_hits_upper,
            self.tt_hits_quiescence
        ));
        report.push_str(&format!("TT narrowed:         {:>12}\n", self.tt_narrowed));
        report.push_str(&format!("TT move hints:       {:>12}\n", self.tt_move_hints));
        report.push_str(&format!("TT writes:           {:>12}\n", self.tt_writes));
        if self.cancelled_nodes > 0 || self.cancelled_hits > 0 {
            report.push_str(&format!(
                "Cancelled:           {:>12} (answered from TT {})\n",
                self.cancelled_nodes, self.cancelled_hits
            ));
        }
        for (ply, &count) in self.nodes_by_ply.iter().enumerate() {
            if count > 0 {
                report.push_str(&format!("  ply {ply:>2}: {count:>10} nodes\n"));
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record_and_reset() {
        let mut stats = SearchStats::new(4);
        stats.record_node(0, false);
        stats.record_node(1, false);
        stats.record_node(1, true);
        stats.record_node(9, true);
        stats.record_hit(Bound::Edge);
        stats.record_hit(Bound::UpperBoundQuiescence);
        stats.record_hit(Bound::Quiescence);
        stats.tt_narrowed += 1;

        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.quiescence_nodes, 2);
        assert_eq!(stats.nodes_by_ply, vec![1, 2, 0, 0]);
        assert_eq!(stats.tt_hits(), 3);
        assert_eq!(stats.tt_hits_quiescence, 2);
        assert_eq!(stats.max_ply_reached(), 1);
        let report = stats.format_report();
        assert!(report.contains("ply  1:"));
        assert!(report.contains("TT narrowed:"));

        stats.reset();
        assert_eq!(stats, SearchStats::new(4));
    }
}
