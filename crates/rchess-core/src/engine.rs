//! 対局レベルのエンジン
//!
//! 対局を通して生きるもの（探索器とその置換表、差分評価値、定跡）を持つ。
//! エンジン自身の手番が常に最大化側。

use std::time::Duration;

use crate::book::OpeningBook;
use crate::config::SearchConfig;
use crate::error::EngineResult;
use crate::rules::Rules;
use crate::search::{DriverOutcome, Searcher};
use crate::types::{Side, Value};

/// 選んだ手の出どころ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveSource<M> {
    Book,
    Search(DriverOutcome<M>),
}

/// [`Engine::choose_move`] が選んだ手
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveChoice<M> {
    pub mv: M,
    pub source: MoveSource<M>,
}

impl<M> MoveChoice<M> {
    /// 探索した手ならその評価値
    pub fn value(&self) -> Option<Value> {
        match &self.source {
            MoveSource::Book => None,
            MoveSource::Search(outcome) => Some(outcome.value),
        }
    }
}

pub struct Engine<R: Rules, B: OpeningBook> {
    searcher: Searcher<R>,
    side: Side,
    /// 現局面の差分評価値（`side` から見た値）
    eval: Value,
    /// 初めて答えがなかった時点で以後使わない
    book: Option<B>,
}

impl<R: Rules, B: OpeningBook> Engine<R, B> {
    /// `start` から始まる対局で `side` を持つエンジン
    pub fn new(
        rules: R,
        config: SearchConfig,
        side: Side,
        start: &R::Position,
        book: Option<B>,
    ) -> EngineResult<Self> {
        let searcher = Searcher::new(rules, config)?;
        let eval = searcher.evaluator().static_eval(searcher.rules(), start, side);
        Ok(Self {
            searcher,
            side,
            eval,
            book,
        })
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// 最後に観測した局面の差分評価値
    #[inline]
    pub fn eval(&self) -> Value {
        self.eval
    }

    #[inline]
    pub fn in_book(&self) -> bool {
        self.book.is_some()
    }

    pub fn searcher(&self) -> &Searcher<R> {
        &self.searcher
    }

    /// 設定の持ち時間で `pos` のエンジン側の手を選ぶ
    pub fn choose_move(
        &mut self,
        pos: &R::Position,
        history: &[R::Move],
    ) -> EngineResult<MoveChoice<R::Move>> {
        let budget = self.searcher.config().time_budget();
        self.choose_move_within(pos, history, budget)
    }

    /// `pos` のエンジン側の手を選ぶ
    ///
    /// `history` はここまでの棋譜で、定跡の検索に使う。
    pub fn choose_move_within(
        &mut self,
        pos: &R::Position,
        history: &[R::Move],
        budget: Duration,
    ) -> EngineResult<MoveChoice<R::Move>> {
        if let Some(mv) = self.book_move(pos, history) {
            return Ok(MoveChoice {
                mv,
                source: MoveSource::Book,
            });
        }

        let maximizing = self.searcher.rules().side_to_move(pos) == self.side;
        let outcome = self.searcher.run(pos, budget, maximizing, self.eval)?;
        log::info!(
            "search: {} score {} depth {} nodes {} in {}ms",
            outcome.best_move,
            outcome.value,
            outcome.depth,
            outcome.nodes,
            outcome.elapsed.as_millis()
        );
        Ok(MoveChoice {
            mv: outcome.best_move,
            source: MoveSource::Search(outcome),
        })
    }

    fn book_move(&mut self, pos: &R::Position, history: &[R::Move]) -> Option<R::Move> {
        let book = self.book.as_mut()?;
        let texts: Vec<String> = history.iter().map(ToString::to_string).collect();
        let found = book
            .lookup(&texts)
            .and_then(|text| match self.searcher.rules().parse_move(pos, &text) {
                Ok(mv) => Some(mv),
                Err(e) => {
                    log::warn!("book move rejected: {e}");
                    None
                }
            });
        match found {
            Some(mv) => {
                log::info!("book: {mv}");
                Some(mv)
            }
            None => {
                log::info!("leaving book after {} plies", history.len());
                self.book = None;
                None
            }
        }
    }

    /// `before` から `mv` で `after` になったときに差分評価値を引き継ぐ
    ///
    /// エンジン自身の手も含め、対局の全ての手で呼ぶこと。
    pub fn observe_move(&mut self, before: &R::Position, after: &R::Position, mv: R::Move) {
        let rules = self.searcher.rules();
        let mover_maximizing = rules.side_to_move(before) == self.side;
        self.eval = self
            .searcher
            .evaluator()
            .evaluate(rules, self.eval, before, after, mv, mover_maximizing);
    }
}
