//! 定跡
//!
//! 定跡は UCI 文字列で答えるので、特定のルールエンジンに依存しない。呼び出し側は現局面で
//! 答えを解釈し、非合法なら `None` と同じに扱う。

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// 定跡に手順が1つもないときの初手
pub const DEFAULT_FIRST_MOVE: &str = "e2e4";

/// 序盤の指し手の供給元
pub trait OpeningBook {
    /// `history`（初期局面からの UCI 指し手）の次の手。定跡を外れていれば `None`
    fn lookup(&mut self, history: &[String]) -> Option<String>;
}

/// 定跡ファイルがないときに使う主要な手順
const STANDARD_LINES: &[&str] = &[
    // ルイロペス
    "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 e1g1 f8e7",
    // イタリアン
    "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 c2c3 g8f6 d2d4 e5d4",
    // シシリアン・ナイドルフ
    "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 a7a6",
    // フレンチ・クラシカル
    "e2e4 e7e6 d2d4 d7d5 b1c3 g8f6 c1g5 f8e7",
    // カロカン
    "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4 c8f5",
    // スカンジナビアン
    "e2e4 d7d5 e4d5 d8d5 b1c3 d5a5",
    // クイーンズ・ギャンビット・ディクラインド
    "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7",
    // スラブ
    "d2d4 d7d5 c2c4 c7c6 g1f3 g8f6 b1c3 d5c4",
    // キングズ・インディアン
    "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6 g1f3 e8g8",
    // イングリッシュ
    "c2c4 e7e5 b1c3 g8f6 g1f3 b8c6",
];

/// 序盤の手順を並べた定跡
///
/// `lookup` は履歴の続きになっている手順から一様に選ぶので、シードを変えて対局を繰り返すと
/// 別の序盤に進む。
#[derive(Debug, Clone)]
pub struct LineBook {
    lines: Vec<Vec<String>>,
    rng: Xoshiro256PlusPlus,
}

impl LineBook {
    /// 空白区切りの UCI 指し手の行から作る
    pub fn new<I, S>(lines: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|line| line.as_ref().split_whitespace().map(str::to_owned).collect::<Vec<_>>())
            .filter(|moves| !moves.is_empty())
            .collect();
        Self {
            lines,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// 組み込みの主要手順
    pub fn standard(seed: u64) -> Self {
        Self::new(STANDARD_LINES.iter(), seed)
    }

    /// 定跡ファイルを読む（1行に1手順、`#` 以降はコメント）
    pub fn parse(text: &str, seed: u64) -> Self {
        Self::new(
            text.lines().map(|line| line.split('#').next().unwrap_or_default()),
            seed,
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl OpeningBook for LineBook {
    fn lookup(&mut self, history: &[String]) -> Option<String> {
        if history.is_empty() && self.lines.is_empty() {
            return Some(DEFAULT_FIRST_MOVE.to_owned());
        }
        let candidates: Vec<&String> = self
            .lines
            .iter()
            .filter(|line| line.len() > history.len() && line.starts_with(history))
            .map(|line| &line[history.len()])
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..candidates.len());
        Some(candidates[pick].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ChessRules, Rules};

    fn hist(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_empty_book_opens_with_default() {
        let mut book = LineBook::new(Vec::<String>::new(), 1);
        assert_eq!(book.lookup(&[]), Some(DEFAULT_FIRST_MOVE.to_string()));
        assert_eq!(book.lookup(&hist(&["e2e4"])), None);
    }

    #[test]
    fn test_lookup_follows_matching_prefix() {
        let mut book = LineBook::new(["e2e4 e7e5 g1f3", "e2e4 c7c5", "d2d4 d7d5"], 7);
        assert_eq!(book.lookup(&hist(&["e2e4", "e7e5"])), Some("g1f3".to_string()));
        assert_eq!(book.lookup(&hist(&["d2d4"])), Some("d7d5".to_string()));
        for _ in 0..16 {
            let reply = book.lookup(&hist(&["e2e4"])).unwrap();
            assert!(reply == "e7e5" || reply == "c7c5");
        }
        // 定跡外、および各手順の終わり
        assert_eq!(book.lookup(&hist(&["c2c4"])), None);
        assert_eq!(book.lookup(&hist(&["d2d4", "d7d5"])), None);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = LineBook::standard(42);
        let mut b = LineBook::standard(42);
        for _ in 0..8 {
            assert_eq!(a.lookup(&[]), b.lookup(&[]));
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let book = LineBook::parse("# openings\n\ne2e4 e7e5  # open game\nd2d4 d7d5\n", 0);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_standard_lines_are_legal() {
        let rules = ChessRules::new();
        for line in STANDARD_LINES {
            let mut pos = rules.startpos();
            for text in line.split_whitespace() {
                let mv = rules.parse_move(&pos, text).unwrap_or_else(|e| panic!("{line}: {e}"));
                pos = rules.apply_move(&pos, mv);
            }
        }
    }
}
