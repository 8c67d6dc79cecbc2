//! 探索の各コンポーネントで共有する基本型

mod color;
mod piece;
mod value;

pub use color::Side;
pub use piece::{Piece, PieceKind, Square};
pub use value::Value;

/// 残り探索深さ（手数）。静止探索の中では負になる
pub type Depth = i32;
