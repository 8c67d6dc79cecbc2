use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use rchess_core::book::LineBook;
use rchess_core::rules::ChessRules;
use rchess_core::types::Side;
use rchess_core::{Engine, SearchConfig};

mod game;
mod uci;

use game::{GameConfig, MoveEvent, Opponent, run_game};
use uci::{EngineConfig, EngineProcess};

/// rchess の探索コアを UCI エンジン（または自分自身）と対局させる
///
/// # 使用例
///
/// - Stockfish と対局、rchess が白で1手3秒:
///   `cargo run -p rchess-cli --release -- --engine-path stockfish --think-ms 3000`
///
/// - 指定局面から自己対局し、JSON Lines をファイルに出力:
///   `cargo run -p rchess-cli --release -- --fen "<fen>" --out game.jsonl`
///
/// 1手ごとに JSON オブジェクトを `--out`（なければ標準出力）に書き、最後に結果のオブジェクトを書く。
#[derive(Parser, Debug)]
#[command(author, version, about = "rchess game runner (rchess vs UCI engine or self-play)")]
struct Cli {
    /// UCI の相手のパス（省略時は rchess 同士）
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// 相手に渡す追加のコマンドライン引数
    #[arg(long = "engine-arg", num_args = 1..)]
    engine_args: Vec<String>,

    /// 相手の UCI オプション（Name=Value）
    #[arg(long = "uci-option", num_args = 1..)]
    uci_options: Vec<String>,

    /// rchess が持つ側（white|black）
    #[arg(long, default_value = "white")]
    engine_side: Side,

    /// 引き分けにするまでの最大手数
    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// rchess の1手あたりの思考時間（ミリ秒、設定ファイルより優先）
    #[arg(long)]
    think_ms: Option<u64>,

    /// 最深の反復（設定ファイルより優先）
    #[arg(long)]
    max_depth: Option<i32>,

    /// UCI の相手への `go movetime`
    #[arg(long, default_value_t = 10)]
    opponent_movetime_ms: u64,

    /// 開始局面（省略時は初期局面）
    #[arg(long)]
    fen: Option<String>,

    /// 探索設定（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 定跡ファイル（1行に1手順の UCI 指し手）
    #[arg(long)]
    book: Option<PathBuf>,

    /// 定跡を使わない
    #[arg(long, default_value_t = false)]
    no_book: bool,

    /// 定跡選択のシード
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSONL の出力先（省略時は標準出力）
    #[arg(long)]
    out: Option<PathBuf>,

    /// ログを増やす（-v で debug、-vv で trace）。RUST_LOG が優先
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<SearchConfig>(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => SearchConfig::default(),
    };
    if let Some(ms) = cli.think_ms {
        config.time_budget_ms = ms;
    }
    if let Some(depth) = cli.max_depth {
        config.max_depth = depth;
    }
    config.validate()?;
    Ok(config)
}

fn load_book(cli: &Cli, seed: u64) -> Result<Option<LineBook>> {
    if cli.no_book {
        return Ok(None);
    }
    match &cli.book {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read book {}", path.display()))?;
            let book = LineBook::parse(&text, seed);
            if book.is_empty() {
                bail!("book {} has no lines", path.display());
            }
            Ok(Some(book))
        }
        None => Ok(Some(LineBook::standard(seed))),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

fn write_event(out: &mut dyn Write, event: &MoveEvent) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = load_config(&cli)?;
    let rules = ChessRules::new();
    let start = match &cli.fen {
        Some(fen) => rules.parse_fen(fen)?,
        None => rules.startpos(),
    };
    let think = Duration::from_millis(config.time_budget_ms);

    let mut engine = Engine::new(
        ChessRules::new(),
        config.clone(),
        cli.engine_side,
        &start,
        load_book(&cli, cli.seed)?,
    )?;
    let mut opponent = match &cli.engine_path {
        Some(path) => {
            let cfg = EngineConfig {
                path: path.clone(),
                args: cli.engine_args.clone(),
                uci_options: cli.uci_options.clone(),
            };
            Opponent::Uci(EngineProcess::spawn(&cfg, path.display().to_string())?)
        }
        None => Opponent::Internal(Box::new(Engine::new(
            ChessRules::new(),
            config,
            !cli.engine_side,
            &start,
            load_book(&cli, cli.seed.wrapping_add(1))?,
        )?)),
    };
    log::info!(
        "rchess plays {} against {} from {}",
        cli.engine_side,
        opponent.label(),
        rules.to_fen(&start)
    );

    let mut out = open_output(cli.out.as_deref())?;
    let mut write_error = None;
    let game_config = GameConfig {
        max_moves: cli.max_moves,
        think,
        opponent_movetime_ms: cli.opponent_movetime_ms,
    };
    let result = run_game(&mut engine, &mut opponent, start, &game_config, &mut |event: &MoveEvent| {
        log::info!(
            "{:>3} {:<5} {:<6} {:<6} score {:>7} depth {:>2}",
            event.ply,
            event.side,
            event.player,
            event.move_uci,
            event.score.map_or_else(|| "-".to_string(), |s| s.to_string()),
            event.depth.map_or_else(|| "-".to_string(), |d| d.to_string())
        );
        if write_error.is_none() {
            if let Err(e) = write_event(&mut out, event) {
                write_error = Some(e);
            }
        }
    })?;
    if let Some(e) = write_error {
        return Err(e.context("failed to write move event"));
    }

    serde_json::to_writer(&mut out, &result)?;
    writeln!(out)?;
    out.flush()?;
    log::info!("game over: {:?} ({}) after {} plies", result.outcome, result.reason, result.plies);
    Ok(())
}
