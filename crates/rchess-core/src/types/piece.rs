//! 駒種、色付きの駒、盤上のマス

use super::Side;

/// 色なしの駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// 駒種の数
    pub const NUM: usize = 6;

    pub const ALL: [PieceKind; PieceKind::NUM] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 色付きの駒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    /// 色付きの駒の数
    pub const NUM: usize = Side::NUM * PieceKind::NUM;

    #[inline]
    pub const fn new(side: Side, kind: PieceKind) -> Piece {
        Piece { side, kind }
    }

    /// `0..Piece::NUM` のインデックス（白の駒が先）
    #[inline]
    pub const fn index(self) -> usize {
        self.side.index() * PieceKind::NUM + self.kind.index()
    }
}

/// 盤上のマス（a1 = 0 .. h8 = 63）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    /// 生のインデックスから作る。範囲外なら `None`
    #[inline]
    pub const fn new(index: u8) -> Option<Square> {
        if (index as usize) < Self::NUM { Some(Square(index)) } else { None }
    }

    /// 盤上と分かっているインデックスから作る。下位6bitだけを使う
    #[inline]
    pub const fn from_index_masked(index: usize) -> Square {
        Square((index & 63) as u8)
    }

    /// 筋（0 = a）と段（0 = 1段目）から作る
    #[inline]
    pub const fn from_file_rank(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 { Some(Square(rank * 8 + file)) } else { None }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 筋のインデックス（0 = a）
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// 段のインデックス（0 = 1段目）
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}
