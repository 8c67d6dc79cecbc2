use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, MoveGen};

use super::{MoveInfo, Outcome, Rules};
use crate::error::{EngineError, EngineResult};
use crate::types::{Piece, PieceKind, Side, Square};

/// `chess` クレートによる標準ルール
///
/// サイズ0の型。局面は `chess::Board` の値（指すたびにコピー）。
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    pub fn new() -> Self {
        ChessRules
    }

    /// 初期局面
    pub fn startpos(&self) -> Board {
        Board::default()
    }

    pub fn parse_fen(&self, fen: &str) -> EngineResult<Board> {
        Board::from_str(fen.trim())
            .map_err(|e| EngineError::InvalidPosition(format!("{fen}: {e:?}")))
    }

    pub fn to_fen(&self, pos: &Board) -> String {
        pos.to_string()
    }
}

fn convert_side(color: chess::Color) -> Side {
    match color {
        chess::Color::White => Side::White,
        chess::Color::Black => Side::Black,
    }
}

fn convert_kind(piece: chess::Piece) -> PieceKind {
    match piece {
        chess::Piece::Pawn => PieceKind::Pawn,
        chess::Piece::Knight => PieceKind::Knight,
        chess::Piece::Bishop => PieceKind::Bishop,
        chess::Piece::Rook => PieceKind::Rook,
        chess::Piece::Queen => PieceKind::Queen,
        chess::Piece::King => PieceKind::King,
    }
}

fn convert_square(sq: chess::Square) -> Square {
    // どちらのクレートもマス番号は a1 = 0 .. h8 = 63
    Square::from_index_masked(sq.to_index())
}

/// 玉対玉、または玉と小駒1枚対玉
fn insufficient_material(pos: &Board) -> bool {
    let occupied = pos.combined().popcnt();
    if occupied <= 2 {
        return true;
    }
    if occupied == 3 {
        let minors = *pos.pieces(chess::Piece::Knight) | *pos.pieces(chess::Piece::Bishop);
        return minors.popcnt() == 1;
    }
    false
}

fn parse_uci_square(text: &str) -> Option<chess::Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a').filter(|f| *f < 8)?;
    let rank = bytes[1].checked_sub(b'1').filter(|r| *r < 8)?;
    Some(chess::Square::make_square(
        chess::Rank::from_index(rank as usize),
        chess::File::from_index(file as usize),
    ))
}

fn parse_promotion(c: char) -> Option<chess::Piece> {
    match c.to_ascii_lowercase() {
        'q' => Some(chess::Piece::Queen),
        'r' => Some(chess::Piece::Rook),
        'b' => Some(chess::Piece::Bishop),
        'n' => Some(chess::Piece::Knight),
        _ => None,
    }
}

impl Rules for ChessRules {
    type Position = Board;
    type Move = ChessMove;

    fn legal_moves(&self, pos: &Board) -> Vec<ChessMove> {
        MoveGen::new_legal(pos).collect()
    }

    fn apply_move(&self, pos: &Board, mv: ChessMove) -> Board {
        pos.make_move_new(mv)
    }

    fn is_legal(&self, pos: &Board, mv: ChessMove) -> bool {
        pos.legal(mv)
    }

    fn outcome(&self, pos: &Board) -> Outcome {
        match pos.status() {
            BoardStatus::Checkmate => Outcome::Win(convert_side(!pos.side_to_move())),
            BoardStatus::Stalemate => Outcome::Draw,
            BoardStatus::Ongoing if insufficient_material(pos) => Outcome::Draw,
            BoardStatus::Ongoing => Outcome::Ongoing,
        }
    }

    fn side_to_move(&self, pos: &Board) -> Side {
        convert_side(pos.side_to_move())
    }

    fn move_info(&self, pos: &Board, mv: ChessMove) -> MoveInfo {
        let from = mv.get_source();
        let to = mv.get_dest();
        let piece = pos.piece_on(from).unwrap_or(chess::Piece::Pawn);
        let captured = match pos.piece_on(to) {
            Some(p) => Some(convert_kind(p)),
            // ポーンが空きマスへ筋を変えたらアンパッサン
            None if piece == chess::Piece::Pawn && from.get_file() != to.get_file() => {
                Some(PieceKind::Pawn)
            }
            None => None,
        };
        let gives_check = pos.make_move_new(mv).checkers().popcnt() > 0;

        MoveInfo {
            from: convert_square(from),
            to: convert_square(to),
            piece: convert_kind(piece),
            captured,
            promotion: mv.get_promotion().map(convert_kind),
            gives_check,
        }
    }

    fn pieces(&self, pos: &Board) -> Vec<(Piece, Square)> {
        let mut out = Vec::with_capacity(32);
        for sq in *pos.combined() {
            if let (Some(kind), Some(color)) = (pos.piece_on(sq), pos.color_on(sq)) {
                out.push((Piece::new(convert_side(color), convert_kind(kind)), convert_square(sq)));
            }
        }
        out
    }

    fn parse_move(&self, pos: &Board, text: &str) -> EngineResult<ChessMove> {
        let text = text.trim();
        let illegal = || EngineError::IllegalMove(format!("{text} in {pos}"));
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(illegal());
        }
        let from = parse_uci_square(&text[0..2]).ok_or_else(illegal)?;
        let to = parse_uci_square(&text[2..4]).ok_or_else(illegal)?;
        let promotion = match text.chars().nth(4) {
            Some(c) => Some(parse_promotion(c).ok_or_else(illegal)?),
            None => None,
        };
        let mv = ChessMove::new(from, to, promotion);
        if pos.legal(mv) { Ok(mv) } else { Err(illegal()) }
    }
}
