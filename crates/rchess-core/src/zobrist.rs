//! Zobrist ハッシュ
//!
//! キーは駒のある (駒, マス) ごとの定数の XOR に、黒番なら手番の定数を加えたもの。
//! キャスリング権とアンパッサンはキーに含まないので、それらだけが違う局面は同じキーになる。

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::rules::Rules;
use crate::types::{Piece, Side, Square};

/// キーテーブルのデフォルトシード
pub const DEFAULT_ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// 乱数キーテーブル
#[derive(Clone)]
pub struct ZobristKeys {
    /// 黒番
    side: u64,
    /// [Piece.index()][Square.index()]
    psq: [[u64; Square::NUM]; Piece::NUM],
}

impl ZobristKeys {
    /// シードからテーブルを生成する。同じシードなら常に同じテーブル
    pub fn new(seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let side = non_zero(&mut rng);
        let mut psq = [[0u64; Square::NUM]; Piece::NUM];
        for row in psq.iter_mut() {
            for key in row.iter_mut() {
                *key = non_zero(&mut rng);
            }
        }
        Self { side, psq }
    }

    #[inline]
    pub fn psq(&self, piece: Piece, sq: Square) -> u64 {
        self.psq[piece.index()][sq.index()]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.side
    }

    /// 局面全体のキー
    pub fn key<R: Rules>(&self, rules: &R, pos: &R::Position) -> u64 {
        let mut key = rules
            .pieces(pos)
            .into_iter()
            .fold(0u64, |acc, (piece, sq)| acc ^ self.psq(piece, sq));
        if rules.side_to_move(pos) == Side::Black {
            key ^= self.side;
        }
        key
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(DEFAULT_ZOBRIST_SEED)
    }
}

fn non_zero(rng: &mut Xoshiro256PlusPlus) -> u64 {
    loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ChessRules;
    use crate::types::PieceKind;

    #[test]
    fn test_zobrist_init() {
        let keys = ZobristKeys::default();
        assert_ne!(keys.side(), 0);

        let a1 = Square::from_file_rank(0, 0).unwrap();
        let a2 = Square::from_file_rank(0, 1).unwrap();
        let wp = Piece::new(Side::White, PieceKind::Pawn);
        let bp = Piece::new(Side::Black, PieceKind::Pawn);
        assert_ne!(keys.psq(wp, a1), keys.psq(wp, a2));
        assert_ne!(keys.psq(wp, a1), keys.psq(bp, a1));
    }

    #[test]
    fn test_zobrist_seed_is_deterministic() {
        let a = ZobristKeys::new(7);
        let b = ZobristKeys::new(7);
        let c = ZobristKeys::new(8);
        let sq = Square::from_file_rank(4, 4).unwrap();
        let q = Piece::new(Side::White, PieceKind::Queen);
        assert_eq!(a.psq(q, sq), b.psq(q, sq));
        assert_eq!(a.side(), b.side());
        assert_ne!(a.psq(q, sq), c.psq(q, sq));
    }

    #[test]
    fn test_zobrist_transposition_same_key() {
        let rules = ChessRules::new();
        let keys = ZobristKeys::default();
        let start = rules.startpos();

        let play = |moves: &[&str]| {
            moves.iter().fold(start, |pos, text| {
                let mv = rules.parse_move(&pos, text).unwrap();
                rules.apply_move(&pos, mv)
            })
        };
        let a = play(&["g1f3", "g8f6", "b1c3"]);
        let b = play(&["b1c3", "g8f6", "g1f3"]);
        assert_eq!(keys.key(&rules, &a), keys.key(&rules, &b));

        let c = play(&["g1f3", "g8f6"]);
        assert_ne!(keys.key(&rules, &a), keys.key(&rules, &c));
    }

    #[test]
    fn test_zobrist_side_to_move_changes_key() {
        let rules = ChessRules::new();
        let keys = ZobristKeys::default();
        let white = rules.parse_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        let black = rules.parse_fen("8/8/4k3/8/8/4K3/8/8 b - - 0 1").unwrap();
        assert_eq!(keys.key(&rules, &white) ^ keys.side(), keys.key(&rules, &black));
    }
}
