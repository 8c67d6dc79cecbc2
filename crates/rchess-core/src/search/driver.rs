//! 反復深化ドライバ
//!
//! 持ち時間を使い切るか、勝敗の確定した値が出るか、深さの上限に達するまで、全幅の窓で
//! 深さ1, 2, ... と探索する。置換表は全反復で共有するので、各反復は前の反復が残した
//! オーダリングから始まる。期限に当たった反復は丸ごと捨て、報告するのは完了した反復だけ。

use std::time::{Duration, Instant};

use crate::error::{EngineError, EngineResult};
use crate::rules::Rules;
use crate::types::{Depth, Value};

use super::history::SearchHistory;
use super::searcher::Searcher;

/// 完了した最深の反復の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome<M> {
    pub best_move: M,
    /// 最大化側から見たルートの評価値
    pub value: Value,
    /// その手を出した反復の深さ
    pub depth: Depth,
    pub line: SearchHistory<M>,
    /// 全反復のノード数（捨てた反復も含む）
    pub nodes: u64,
    pub elapsed: Duration,
}

impl<R: Rules> Searcher<R> {
    /// `budget` 以内に `root` の手番側の手を選ぶ
    ///
    /// `maximizing` は手番側が最大化側かどうか、`seed` は `root` の差分評価値。
    pub fn run(
        &mut self,
        root: &R::Position,
        budget: Duration,
        maximizing: bool,
        seed: Value,
    ) -> EngineResult<DriverOutcome<R::Move>> {
        let outcome = self.rules().outcome(root);
        if outcome.is_terminal() {
            return Err(EngineError::GameOver(outcome));
        }

        let start = Instant::now();
        self.set_deadline(Some(start + budget));
        let max_depth = self.config().max_depth;
        let threshold = self.config().forced_win_threshold();

        let mut best: Option<DriverOutcome<R::Move>> = None;
        let mut nodes = 0u64;

        for depth in 1..=max_depth {
            self.reset_stats();
            let result = self.search(root, depth, -Value::INFINITE, Value::INFINITE, maximizing, seed);
            nodes += self.stats().nodes;
            let elapsed = start.elapsed();

            if self.is_cancelled() || result.unreliable {
                log::debug!(
                    "depth {depth} interrupted after {}ms ({} nodes), discarded",
                    elapsed.as_millis(),
                    self.stats().nodes
                );
                break;
            }
            let Some(best_move) = result.best_move else {
                log::warn!("depth {depth} finished without a root move");
                break;
            };

            log::debug!(
                "depth {depth} score {} move {best_move} nodes {} time {}ms hashfull {} line {}",
                result.value,
                self.stats().nodes,
                elapsed.as_millis(),
                self.tt().hashfull(),
                result.line
            );
            #[cfg(feature = "search-trace")]
            log::trace!("depth {depth} stats\n{}", self.stats().format_report());

            let decisive = result.value.abs() >= threshold;
            best = Some(DriverOutcome {
                best_move,
                value: result.value,
                depth,
                line: result.line,
                nodes,
                elapsed,
            });

            if elapsed >= budget || decisive {
                break;
            }
        }

        self.set_deadline(None);
        let elapsed = start.elapsed();
        match best {
            Some(mut found) => {
                found.nodes = nodes;
                found.elapsed = elapsed;
                Ok(found)
            }
            None => Err(EngineError::NoReliableMove { budget }),
        }
    }
}
