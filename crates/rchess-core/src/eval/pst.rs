//! 駒位置評価テーブル
//!
//! 白から見て行0 = 8段目で書いてあるので、盤面図のように読める。黒は上下反転したマスを使う。

use crate::types::{PieceKind, Side, Square};

type Table = [[i32; 8]; 8];

#[rustfmt::skip]
const PAWN: Table = [
    [ 0,  0,   0,   0,   0,   0,  0,  0],
    [50, 50,  50,  50,  50,  50, 50, 50],
    [10, 10,  20,  30,  30,  20, 10, 10],
    [ 5,  5,  10,  25,  25,  10,  5,  5],
    [ 0,  0,   0,  20,  20,   0,  0,  0],
    [ 5, -5, -10,   0,   0, -10, -5,  5],
    [ 5, 10,  10, -20, -20,  10, 10,  5],
    [ 0,  0,   0,   0,   0,   0,  0,  0],
];

#[rustfmt::skip]
const KNIGHT: Table = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   0,   0,   0, -20, -40],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

#[rustfmt::skip]
const BISHOP: Table = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10,   0,   0,   0,   0,   0,   0, -10],
    [-10,   0,   5,  10,  10,   5,   0, -10],
    [-10,   5,   5,  10,  10,   5,   5, -10],
    [-10,   0,  10,  10,  10,  10,   0, -10],
    [-10,  10,  10,  10,  10,  10,  10, -10],
    [-10,   5,   0,   0,   0,   0,   5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

#[rustfmt::skip]
const ROOK: Table = [
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 5, 10, 10, 10, 10, 10, 10,  5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [-5,  0,  0,  0,  0,  0,  0, -5],
    [ 0,  0,  0,  5,  5,  0,  0,  0],
];

#[rustfmt::skip]
const QUEEN: Table = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10,   0,   0,  0,  0,   0,   0, -10],
    [-10,   0,   5,  5,  5,   5,   0, -10],
    [ -5,   0,   5,  5,  5,   5,   0,  -5],
    [  0,   0,   5,  5,  5,   5,   0,  -5],
    [-10,   5,   5,  5,  5,   5,   0, -10],
    [-10,   0,   5,  0,  0,   0,   0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

#[rustfmt::skip]
const KING: Table = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [ 20,  20,   0,   0,   0,   0,  20,  20],
    [ 20,  30,  10,   0,   0,  10,  30,  20],
];

const fn table(kind: PieceKind) -> &'static Table {
    match kind {
        PieceKind::Pawn => &PAWN,
        PieceKind::Knight => &KNIGHT,
        PieceKind::Bishop => &BISHOP,
        PieceKind::Rook => &ROOK,
        PieceKind::Queen => &QUEEN,
        PieceKind::King => &KING,
    }
}

/// `side` の `kind` が `sq` にいるときの位置評価
#[inline]
pub fn square_value(kind: PieceKind, side: Side, sq: Square) -> i32 {
    let rank = sq.rank() as usize;
    let row = match side {
        Side::White => 7 - rank,
        Side::Black => rank,
    };
    table(kind)[row][sq.file() as usize]
}

/// `kind` を `from` から `to` に動かしたときの位置評価の増分
#[inline]
pub fn delta(kind: PieceKind, side: Side, from: Square, to: Square) -> i32 {
    square_value(kind, side, to) - square_value(kind, side, from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        let b = name.as_bytes();
        Square::from_file_rank(b[0] - b'a', b[1] - b'1').unwrap()
    }

    #[test]
    fn test_pst_white_pawn_push() {
        assert_eq!(square_value(PieceKind::Pawn, Side::White, sq("e2")), -20);
        assert_eq!(square_value(PieceKind::Pawn, Side::White, sq("e4")), 20);
        assert_eq!(delta(PieceKind::Pawn, Side::White, sq("e2"), sq("e4")), 40);
    }

    #[test]
    fn test_pst_mirrored_for_black() {
        for kind in PieceKind::ALL {
            for file in 0..8u8 {
                for rank in 0..8u8 {
                    let white_sq = Square::from_file_rank(file, rank).unwrap();
                    let black_sq = Square::from_file_rank(file, 7 - rank).unwrap();
                    assert_eq!(
                        square_value(kind, Side::White, white_sq),
                        square_value(kind, Side::Black, black_sq)
                    );
                }
            }
        }
    }

    #[test]
    fn test_pst_king_prefers_castled_corner() {
        assert!(
            square_value(PieceKind::King, Side::White, sq("g1"))
                > square_value(PieceKind::King, Side::White, sq("e1"))
        );
        assert!(
            square_value(PieceKind::King, Side::Black, sq("g8"))
                > square_value(PieceKind::King, Side::Black, sq("e8"))
        );
    }
}
