//! 探索コアのエラー型
//!
//! キャンセル、ハッシュ衝突、静かな末端ノードはここには出てこない（探索の中で番兵的な結果として
//! 吸収する）。呼び出し側が対処すべき状況だけをエラーにする。

use std::time::Duration;

use crate::rules::Outcome;

/// エンジンレベルのエラー
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// 持ち時間内に深さ1の反復すら完了しなかった
    #[error("no reliable move found within {budget:?}; the time budget is too small")]
    NoReliableMove { budget: Duration },

    /// ルート局面がすでに終局している
    #[error("game is already over: {0:?}")]
    GameOver(Outcome),

    /// ルールエンジンが局面文字列を解釈できなかった
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// 指し手文字列が不正か、その局面で合法でない
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// 探索設定が矛盾している
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// エンジン操作の Result 型
pub type EngineResult<T> = Result<T, EngineError>;
