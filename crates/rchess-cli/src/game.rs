//! rchess エンジンと相手との1局

use std::time::{Duration, Instant};

use anyhow::Result;
use chess::{Board, ChessMove};
use serde::Serialize;

use rchess_core::book::LineBook;
use rchess_core::rules::{ChessRules, Outcome, Rules};
use rchess_core::types::Side;
use rchess_core::{Engine, MoveChoice, MoveSource};

use crate::uci::EngineProcess;

pub type ChessEngine = Engine<ChessRules, LineBook>;

/// rchess が持たない側
pub enum Opponent {
    Uci(EngineProcess),
    /// もう1つの rchess エンジン（自己対局）
    Internal(Box<ChessEngine>),
}

impl Opponent {
    pub fn label(&self) -> &str {
        match self {
            Opponent::Uci(process) => &process.label,
            Opponent::Internal(_) => "rchess-opponent",
        }
    }
}

pub struct GameConfig {
    pub max_moves: u32,
    /// rchess の1手あたりの思考時間
    pub think: Duration,
    /// UCI の相手に送る `go movetime`
    pub opponent_movetime_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameOutcome {
    fn win_for(side: Side) -> Self {
        match side {
            Side::White => GameOutcome::WhiteWin,
            Side::Black => GameOutcome::BlackWin,
        }
    }
}

/// 1手ごとに出力する
#[derive(Debug, Clone, Serialize)]
pub struct MoveEvent {
    pub ply: u32,
    pub side: Side,
    pub player: String,
    pub fen_before: String,
    #[serde(rename = "move")]
    pub move_uci: String,
    /// "book"、"search"、"uci" のいずれか
    pub source: &'static str,
    pub score: Option<i32>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub line: Option<String>,
    pub elapsed_ms: u64,
    /// 指した後の rchess の差分評価値（rchess 側から見た値）
    pub eval: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub reason: String,
    pub plies: u32,
    pub final_fen: String,
}

struct PlayedMove {
    mv: ChessMove,
    source: &'static str,
    choice: Option<MoveChoice<ChessMove>>,
}

fn from_choice(choice: MoveChoice<ChessMove>) -> PlayedMove {
    let source = match choice.source {
        MoveSource::Book => "book",
        MoveSource::Search(_) => "search",
    };
    PlayedMove {
        mv: choice.mv,
        source,
        choice: Some(choice),
    }
}

/// `start` から1局指す
///
/// 詰み、ルールによる引き分け、相手の失敗（時間切れ、指し手なし、非合法手）で終わる。
/// `max_moves` 手に達したら引き分けとする。
pub fn run_game(
    engine: &mut ChessEngine,
    opponent: &mut Opponent,
    start: Board,
    config: &GameConfig,
    on_move: &mut dyn FnMut(&MoveEvent),
) -> Result<GameResult> {
    let rules = ChessRules::new();
    let mut pos = start;
    let mut history: Vec<ChessMove> = Vec::new();
    let mut result = None;
    let mut plies = 0u32;

    while plies < config.max_moves {
        match rules.outcome(&pos) {
            Outcome::Ongoing => {}
            Outcome::Win(side) => {
                result = Some((GameOutcome::win_for(side), "checkmate".to_string()));
                break;
            }
            Outcome::Draw => {
                result = Some((GameOutcome::Draw, "draw".to_string()));
                break;
            }
        }

        let side = rules.side_to_move(&pos);
        let fen_before = rules.to_fen(&pos);
        let started = Instant::now();

        let (player, played) = if side == engine.side() {
            let choice = engine.choose_move_within(&pos, &history, config.think)?;
            ("rchess".to_string(), from_choice(choice))
        } else {
            let label = opponent.label().to_string();
            match opponent {
                Opponent::Internal(other) => {
                    let choice = other.choose_move_within(&pos, &history, config.think)?;
                    (label, from_choice(choice))
                }
                Opponent::Uci(process) => {
                    let reply = process.go_movetime(&fen_before, config.opponent_movetime_ms)?;
                    let parsed = reply.bestmove.as_deref().map(|text| rules.parse_move(&pos, text));
                    match (reply.timed_out, parsed) {
                        (false, Some(Ok(mv))) => (label, PlayedMove { mv, source: "uci", choice: None }),
                        (true, _) => {
                            log::warn!("{label} timed out after {}ms", reply.elapsed_ms);
                            result = Some((GameOutcome::win_for(!side), "timeout".to_string()));
                            break;
                        }
                        (false, None) => {
                            log::warn!("{label} returned no move in {fen_before}");
                            result = Some((GameOutcome::win_for(!side), "no_bestmove".to_string()));
                            break;
                        }
                        (false, Some(Err(e))) => {
                            log::warn!("{label}: {e}");
                            result = Some((GameOutcome::win_for(!side), "illegal_move".to_string()));
                            break;
                        }
                    }
                }
            }
        };

        let next = rules.apply_move(&pos, played.mv);
        engine.observe_move(&pos, &next, played.mv);
        if let Opponent::Internal(other) = opponent {
            other.observe_move(&pos, &next, played.mv);
        }
        plies += 1;

        let search = played.choice.as_ref().and_then(|c| match &c.source {
            MoveSource::Search(outcome) => Some(outcome),
            MoveSource::Book => None,
        });
        let event = MoveEvent {
            ply: plies,
            side,
            player,
            fen_before,
            move_uci: played.mv.to_string(),
            source: played.source,
            score: search.map(|o| o.value.raw()),
            depth: search.map(|o| o.depth),
            nodes: search.map(|o| o.nodes),
            line: search.map(|o| o.line.to_string()),
            elapsed_ms: started.elapsed().as_millis() as u64,
            eval: engine.eval().raw(),
        };
        on_move(&event);

        history.push(played.mv);
        pos = next;
    }

    let (outcome, reason) = match result {
        Some(found) => found,
        // 最後の手がちょうど手数上限で対局を終わらせたかもしれない
        None => match rules.outcome(&pos) {
            Outcome::Win(side) => (GameOutcome::win_for(side), "checkmate".to_string()),
            Outcome::Draw => (GameOutcome::Draw, "draw".to_string()),
            Outcome::Ongoing => (GameOutcome::Draw, "max_moves".to_string()),
        },
    };

    Ok(GameResult {
        outcome,
        reason,
        plies,
        final_fen: rules.to_fen(&pos),
    })
}
