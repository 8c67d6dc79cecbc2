//! 外部の UCI 対局相手
//!
//! エンジンを子プロセスとして動かす。読み出しスレッドが標準出力の行をチャネルに流すので、
//! どの読み出しもタイムアウトできる。

use std::collections::HashSet;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};

pub const ENGINE_READY_TIMEOUT: Duration = Duration::from_secs(30);
pub const ENGINE_QUIT_TIMEOUT: Duration = Duration::from_millis(300);
pub const ENGINE_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// `stop` を送るまでの `movetime` への余裕
pub const MOVE_TIMEOUT_MARGIN: Duration = Duration::from_millis(1000);

/// 相手の起動方法
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// 追加の UCI オプション（`Name=Value`）
    pub uci_options: Vec<String>,
}

/// `go movetime` 1回への応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentMove {
    /// エンジンが答えなかったか、`(none)` / `0000` を返したら `None`
    pub bestmove: Option<String>,
    pub elapsed_ms: u64,
    pub timed_out: bool,
}

pub struct EngineProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    rx: Receiver<String>,
    opt_names: HashSet<String>,
    pub label: String,
}

impl EngineProcess {
    pub fn spawn(cfg: &EngineConfig, label: String) -> Result<Self> {
        let mut child = Command::new(&cfg.path)
            .args(&cfg.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn engine at {}", cfg.path.display()))?;
        let stdin = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout"))?;
        let (tx, rx) = mpsc::channel::<String>();
        std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut proc = Self {
            child,
            stdin: BufWriter::new(stdin),
            rx,
            opt_names: HashSet::new(),
            label,
        };
        proc.initialize(cfg)?;
        Ok(proc)
    }

    fn initialize(&mut self, cfg: &EngineConfig) -> Result<()> {
        self.write_line("uci")?;
        loop {
            let line = self.recv_line(ENGINE_READY_TIMEOUT)?;
            if let Some(rest) = line.strip_prefix("option ") {
                if let Some(name) = parse_option_name(rest) {
                    self.opt_names.insert(name);
                }
            } else if line == "uciok" {
                break;
            }
        }
        for opt in &cfg.uci_options {
            match opt.split_once('=') {
                Some((name, value)) => self.set_option_if_available(name.trim(), value.trim())?,
                None => self.write_line(&format!("setoption name {}", opt.trim()))?,
            }
        }
        self.sync_ready()?;
        self.write_line("ucinewgame")?;
        self.sync_ready()
    }

    /// 固定の思考時間で `fen` の指し手を求める
    pub fn go_movetime(&mut self, fen: &str, movetime_ms: u64) -> Result<OpponentMove> {
        self.write_line(&format!("position fen {fen}"))?;
        self.write_line(&format!("go movetime {movetime_ms}"))?;

        let start = Instant::now();
        let soft_limit = Duration::from_millis(movetime_ms) + MOVE_TIMEOUT_MARGIN;
        let hard_limit = soft_limit + MOVE_TIMEOUT_MARGIN;
        let mut stop_sent = false;

        loop {
            let elapsed = start.elapsed();
            let deadline = if stop_sent { hard_limit } else { soft_limit };
            if elapsed >= deadline {
                if !stop_sent {
                    self.write_line("stop")?;
                    stop_sent = true;
                    continue;
                }
                return Ok(OpponentMove {
                    bestmove: None,
                    elapsed_ms: elapsed.as_millis() as u64,
                    timed_out: true,
                });
            }

            match self.rx.recv_timeout(deadline - elapsed) {
                Ok(line) => {
                    if let Some(rest) = line.strip_prefix("bestmove") {
                        let mv = rest.split_whitespace().next().unwrap_or_default();
                        let bestmove = match mv {
                            "" | "(none)" | "0000" => None,
                            mv => Some(mv.to_string()),
                        };
                        return Ok(OpponentMove {
                            bestmove,
                            elapsed_ms: start.elapsed().as_millis() as u64,
                            timed_out: stop_sent,
                        });
                    }
                    log::trace!("{}: {line}", self.label);
                }
                // ループに戻る。期限チェックが `stop` を送るか諦める
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("{}: engine exited unexpectedly", self.label);
                }
            }
        }
    }

    pub fn sync_ready(&mut self) -> Result<()> {
        self.write_line("isready")?;
        loop {
            if self.recv_line(ENGINE_READY_TIMEOUT)? == "readyok" {
                return Ok(());
            }
        }
    }

    pub fn recv_line(&self, timeout: Duration) -> Result<String> {
        self.rx
            .recv_timeout(timeout)
            .map_err(|_| anyhow!("{}: engine read timeout", self.label))
    }

    pub fn set_option_if_available(&mut self, name: &str, value: &str) -> Result<()> {
        if self.opt_names.is_empty() || self.opt_names.contains(name) {
            self.write_line(&format!("setoption name {name} value {value}"))?;
        } else {
            log::warn!("{}: unknown option {name}, skipped", self.label);
        }
        Ok(())
    }

    pub fn write_line(&mut self, msg: &str) -> Result<()> {
        log::trace!("{} <- {msg}", self.label);
        self.stdin.write_all(msg.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.write_line("quit");
        let deadline = Instant::now() + ENGINE_QUIT_TIMEOUT;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            std::thread::sleep(ENGINE_QUIT_POLL_INTERVAL);
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// `option name <name> type ...` 行の末尾からオプション名を取り出す
pub fn parse_option_name(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    tokens.by_ref().find(|&tok| tok == "name")?;
    let parts: Vec<&str> = tokens.take_while(|&tok| tok != "type").collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}
