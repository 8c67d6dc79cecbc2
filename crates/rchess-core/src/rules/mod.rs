//! 探索が使うルールエンジンのインターフェース
//!
//! 探索は局面の中身を直接見ない。必要なもの（合法手、指し手の適用、終局判定、指し手のタグ、
//! ハッシュ用の駒配置）は全て [`Rules`] を通す。[`ChessRules`] は `chess` クレートの上の実装。

mod chess_rules;

pub use chess_rules::ChessRules;

use std::fmt;
use std::hash::Hash;

use crate::error::EngineResult;
use crate::types::{Piece, PieceKind, Side, Square};

/// 局面の終局状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Win(Side),
    Draw,
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Outcome::Ongoing
    }
}

/// オーダリング・フィルタ・評価関数が1手について知る必要のある情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInfo {
    pub from: Square,
    pub to: Square,
    /// 動かす駒（成りならポーン）
    pub piece: PieceKind,
    /// 取る駒種。アンパッサンならポーン
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    /// 指した後に相手玉が王手になっている
    pub gives_check: bool,
}

impl MoveInfo {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// 駒取りか成り
    #[inline]
    pub fn is_noisy(&self) -> bool {
        self.is_capture() || self.is_promotion()
    }
}

/// 探索が使うルールエンジン
///
/// `apply_move` は独立した局面を返すこと。探索は子を調べている間も親局面を保持する。
pub trait Rules {
    type Position: Clone;
    type Move: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    /// 全合法手（生成順）
    fn legal_moves(&self, pos: &Self::Position) -> Vec<Self::Move>;

    fn apply_move(&self, pos: &Self::Position, mv: Self::Move) -> Self::Position;

    /// `mv` が `pos` で合法か。置換表から来た手の検査に使う
    fn is_legal(&self, pos: &Self::Position, mv: Self::Move) -> bool;

    fn outcome(&self, pos: &Self::Position) -> Outcome;

    fn side_to_move(&self, pos: &Self::Position) -> Side;

    /// `mv` のタグ情報（`pos` で合法であること）
    fn move_info(&self, pos: &Self::Position, mv: Self::Move) -> MoveInfo;

    /// 駒のあるマスとその駒
    fn pieces(&self, pos: &Self::Position) -> Vec<(Piece, Square)>;

    /// 指し手文字列を解釈し、`pos` で合法か確かめる
    fn parse_move(&self, pos: &Self::Position, text: &str) -> EngineResult<Self::Move>;
}
