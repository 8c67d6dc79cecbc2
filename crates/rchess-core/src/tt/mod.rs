//! 置換表
//!
//! Zobrist ハッシュをキーに探索結果をキャッシュする。
//!
//! - `TtEntry`: キャッシュされた結果1件（評価値、境界種別、最善手、並べた指し手リスト）
//! - `Bound`: 評価値と真の値との関係
//! - `TtRead`: 読み出し結果のタグ付き列挙
//! - `TranspositionTable`: 固定長スロット配列、常に上書き
//!
//! エントリは反復深化の各パスをまたいで、また対局中の手をまたいで保持される。

mod entry;
mod table;

pub use entry::{Bound, TtEntry};
pub use table::{TranspositionTable, TtCounters, TtRead};

/// デフォルトのスロット数
pub const DEFAULT_TT_SLOTS: usize = 1 << 18;
