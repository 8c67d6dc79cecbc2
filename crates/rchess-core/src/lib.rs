//! # rchess-core
//!
//! チェスの指し手探索コア
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Side, Piece, Square, Value）
//! - `rules`: ルールエンジンのインターフェースと `chess` クレートによる実装
//! - `zobrist`: 局面ハッシュ
//! - `eval`: 駒割りと駒位置評価の差分評価
//! - `tt`: 置換表
//! - `search`: 静止探索付きαβ、指し手オーダリング、反復深化
//! - `book`: 定跡
//! - `engine`: 対局ごとのエンジン（定跡、評価値の初期値、探索器）
//! - `config`: 探索設定

pub mod types;

pub mod rules;
pub mod zobrist;

pub mod eval;

pub mod tt;

pub mod search;

pub mod book;
pub mod config;
pub mod engine;
pub mod error;

pub use config::SearchConfig;
pub use engine::{Engine, MoveChoice, MoveSource};
pub use error::{EngineError, EngineResult};
