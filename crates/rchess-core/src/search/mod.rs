//! 探索
//!
//! - `searcher`: 静止探索付きαβ、キャンセル、置換表の再利用
//! - `driver`: 持ち時間内の反復深化
//! - `ordering`: 指し手オーダリングと静止探索のフィルタ
//! - `history`: 最善読み筋の記録
//! - `stats`: 反復ごとのカウンタ

mod driver;
mod history;
mod ordering;
mod searcher;
mod stats;

#[cfg(test)]
mod tests;

pub use driver::DriverOutcome;
pub use history::{LineEntry, SearchHistory};
pub use ordering::{exchange_score, order_score, MoveOrderer, CHECK_BONUS, PROMOTION_BONUS};
pub use searcher::{NodeResult, Searcher};
pub use stats::SearchStats;
