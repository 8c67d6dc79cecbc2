//! 探索設定
//!
//! 全フィールドにデフォルト値があるので、一部だけの TOML テーブルでも完全な設定になる。

use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::eval::EvalConfig;
use crate::tt::DEFAULT_TT_SLOTS;
use crate::types::{Depth, Value};
use crate::zobrist::DEFAULT_ZOBRIST_SEED;

/// 探索器と反復深化ドライバで共有する探索設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// エンジン1手あたりの思考時間（ミリ秒）
    pub time_budget_ms: u64,
    /// ドライバが開始する最深の反復
    pub max_depth: Depth,
    /// 静止探索の残り深さの下限（0で静止探索なし）
    pub quiescence_floor: Depth,
    /// 読み筋のスロット数。ルートから到達する ply の上限になる
    pub history_capacity: usize,
    /// 置換表のスロット数
    pub tt_slots: usize,
    /// ルートの評価値の絶対値がこれ以上なら反復深化を打ち切る
    pub forced_win_threshold: i32,
    /// 静止探索のフィルタで即詰みの王手も残す
    pub include_mating_checks: bool,
    pub zobrist_seed: u64,
    pub eval: EvalConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 3000,
            max_depth: 12,
            quiescence_floor: -10,
            history_capacity: 40,
            tt_slots: DEFAULT_TT_SLOTS,
            forced_win_threshold: Value::MATE.raw(),
            include_mating_checks: false,
            zobrist_seed: DEFAULT_ZOBRIST_SEED,
            eval: EvalConfig::default(),
        }
    }
}

impl SearchConfig {
    #[inline]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    #[inline]
    pub fn forced_win_threshold(&self) -> Value {
        Value::new(self.forced_win_threshold)
    }

    /// 探索できない設定を弾く
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_depth < 1 {
            return Err(EngineError::Config(format!(
                "max_depth must be at least 1, got {}",
                self.max_depth
            )));
        }
        if self.quiescence_floor > 0 {
            return Err(EngineError::Config(format!(
                "quiescence_floor must be <= 0, got {}",
                self.quiescence_floor
            )));
        }
        // ルートと、少なくとも1 ply の探索
        if self.history_capacity < 2 {
            return Err(EngineError::Config(format!(
                "history_capacity must be at least 2, got {}",
                self.history_capacity
            )));
        }
        if self.tt_slots == 0 {
            return Err(EngineError::Config("tt_slots must be positive".to_string()));
        }
        if self.forced_win_threshold <= 0 {
            return Err(EngineError::Config(format!(
                "forced_win_threshold must be positive, got {}",
                self.forced_win_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SearchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.time_budget(), Duration::from_secs(3));
        assert_eq!(cfg.forced_win_threshold(), Value::MATE);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: SearchConfig = toml::from_str(
            r#"
            max_depth = 6
            quiescence_floor = 0

            [eval]
            positional = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_depth, 6);
        assert_eq!(cfg.quiescence_floor, 0);
        assert!(!cfg.eval.positional);
        assert_eq!(cfg.history_capacity, 40);
        assert_eq!(cfg.time_budget_ms, 3000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            SearchConfig { max_depth: 0, ..SearchConfig::default() },
            SearchConfig { quiescence_floor: 2, ..SearchConfig::default() },
            SearchConfig { history_capacity: 1, ..SearchConfig::default() },
            SearchConfig { tt_slots: 0, ..SearchConfig::default() },
            SearchConfig { forced_win_threshold: 0, ..SearchConfig::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(EngineError::Config(_))), "{cfg:?}");
        }
    }
}
