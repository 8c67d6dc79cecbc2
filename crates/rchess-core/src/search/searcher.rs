//! 静止探索付きのαβ探索
//!
//! 1つの再帰関数で両方の領域を扱う。残り深さが0より大きい間は、並べた指し手に対する
//! fail-hard のミニマックス（αβ枝刈り）。0以下では駒取りと成りだけを追い、
//! 静止探索の下限に達するまで、差分評価値で stand-pat する。
//!
//! ノードの手順:
//! 1. 期限チェック（キャンセル後は置換表の答えだけが信頼できる）
//! 2. 末端判定（下限、読み筋の容量、終局）
//! 3. 置換表の読み出し（決着、または窓を狭める）
//! 4. 展開（通常探索または静止探索）
//! 5. 置換表への書き込みと最善読み筋の記録

use std::time::Instant;

use crate::config::SearchConfig;
use crate::error::EngineResult;
use crate::eval::Evaluator;
use crate::rules::Rules;
use crate::tt::{Bound, TtRead, TranspositionTable};
use crate::types::{Depth, Value};
use crate::zobrist::ZobristKeys;

use super::history::{LineEntry, SearchHistory};
use super::ordering::MoveOrderer;
use super::stats::SearchStats;

/// 1ノードの探索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResult<M> {
    pub best_move: Option<M>,
    /// 最大化側から見た評価値（呼び出し側の窓に収める）
    pub value: Value,
    /// ルートからこのノードを通る最善読み筋
    pub line: SearchHistory<M>,
    /// 期限切れで置換表にも使えるものがなかった。value と line は無意味で、
    /// 呼び出し側はこの結果を捨てる
    pub unreliable: bool,
}

impl<M: Copy> NodeResult<M> {
    fn unreliable(capacity: usize) -> Self {
        Self {
            best_move: None,
            value: Value::ZERO,
            line: SearchHistory::new(capacity),
            unreliable: true,
        }
    }
}

#[inline]
fn clamp_to_window(value: Value, alpha: Value, beta: Value) -> Value {
    if value < alpha {
        alpha
    } else if value > beta {
        beta
    } else {
        value
    }
}

/// 探索窓
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    alpha: Value,
    beta: Value,
}

impl Window {
    #[inline]
    fn clamp(self, value: Value) -> Value {
        clamp_to_window(value, self.alpha, self.beta)
    }
}

/// 置換表ステップの結果
enum TableStep<M> {
    /// ノードの値が決まった
    Done(NodeResult<M>),
    /// 探索を続ける。窓は狭まっていることがあり、指し手リストが得られることもある
    Continue { cached: Option<CachedMoves<M>>, window: Window },
}

struct CachedMoves<M> {
    moves: Vec<M>,
    /// 静止探索で作ったリスト（駒取り・成りのみ）
    quiescence: bool,
}

/// 対局を通して生きる探索器の状態
///
/// 置換表は反復間・手番間で保持する。統計は反復の開始ごとに driver がリセットする。
pub struct Searcher<R: Rules> {
    rules: R,
    config: SearchConfig,
    evaluator: Evaluator,
    orderer: MoveOrderer,
    zobrist: ZobristKeys,
    tt: TranspositionTable<R::Move>,
    stats: SearchStats,
    deadline: Option<Instant>,
    /// 一度期限を観測したら立ったまま
    cancelled: bool,
}

impl<R: Rules> Searcher<R> {
    pub fn new(rules: R, config: SearchConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            evaluator: Evaluator::new(config.eval),
            orderer: MoveOrderer::new(config.include_mating_checks),
            zobrist: ZobristKeys::new(config.zobrist_seed),
            tt: TranspositionTable::new(config.tt_slots),
            stats: SearchStats::new(config.history_capacity),
            deadline: None,
            cancelled: false,
            rules,
            config,
        })
    }

    #[inline]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    #[inline]
    pub fn zobrist(&self) -> &ZobristKeys {
        &self.zobrist
    }

    #[inline]
    pub fn tt(&self) -> &TranspositionTable<R::Move> {
        &self.tt
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// キャッシュを全て捨てる（新しい対局）
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// 期限を設定・解除する。キャンセルフラグも下ろす
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
        self.cancelled = false;
    }

    /// 今回の探索中に期限を観測したか
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// `pos` を窓 `[alpha, beta]` で残り `depth` 手まで探索する
    ///
    /// `maximizing` は手番側が最大化側かどうか、`prior` は `pos` の差分評価値。
    /// 返す値は窓に収める。
    pub fn search(
        &mut self,
        pos: &R::Position,
        depth: Depth,
        alpha: Value,
        beta: Value,
        maximizing: bool,
        prior: Value,
    ) -> NodeResult<R::Move> {
        self.search_node(pos, depth, 0, alpha, beta, maximizing, prior)
    }

    // =========================================================================
    // ノード
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn search_node(
        &mut self,
        pos: &R::Position,
        depth: Depth,
        ply: usize,
        alpha: Value,
        beta: Value,
        maximizing: bool,
        prior: Value,
    ) -> NodeResult<R::Move> {
        self.stats.record_node(ply, depth <= 0);
        let key = self.zobrist.key(&self.rules, pos);

        if self.time_up() {
            return self.answer_after_cancel(pos, key, depth, ply, alpha, beta);
        }

        if depth <= self.config.quiescence_floor
            || ply + 1 >= self.config.history_capacity
            || self.rules.outcome(pos).is_terminal()
        {
            return self.end_at_edge(key, depth, ply, Window { alpha, beta }, prior);
        }

        let caller = Window { alpha, beta };
        let (cached, window) = match self.consult_table(pos, key, depth, ply, caller) {
            TableStep::Done(result) => return result,
            TableStep::Continue { cached, window } => (cached, window),
        };

        if depth <= 0 {
            // stand-pat だけで窓の外に出る。値は下界にすぎないので保存しない
            let stands = if maximizing { prior >= window.beta } else { prior <= window.alpha };
            if stands {
                return self.edge_result(ply, window.clamp(prior));
            }
            let moves = match cached {
                Some(CachedMoves { moves, quiescence: true }) => moves,
                Some(CachedMoves { moves, quiescence: false }) => {
                    self.orderer.quiescence_filter(&self.rules, pos, &moves)
                }
                None => {
                    let legal = self.rules.legal_moves(pos);
                    self.orderer.quiescence_filter(&self.rules, pos, &legal)
                }
            };
            if moves.is_empty() {
                return self.end_at_edge(key, depth, ply, caller, prior);
            }
            return self.quiescence(pos, key, depth, ply, window, caller, maximizing, prior, moves);
        }

        let moves = match cached {
            Some(CachedMoves { moves, quiescence: false }) => moves,
            _ => {
                let legal = self.rules.legal_moves(pos);
                self.orderer.order(&self.rules, pos, &legal)
            }
        };
        if moves.is_empty() {
            log::warn!("no legal moves in a non-terminal position at ply {ply}");
            return self.end_at_edge(key, depth, ply, caller, prior);
        }
        self.expand(pos, key, depth, ply, window, caller, maximizing, moves, prior)
    }

    fn time_up(&mut self) -> bool {
        if !self.cancelled && self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.cancelled = true;
        }
        self.cancelled
    }

    /// 期限切れ後は置換表からしか答えられない
    ///
    /// 呼び出し側の窓に対して値が決着するエントリだけを使う。
    fn answer_after_cancel(
        &mut self,
        pos: &R::Position,
        key: u64,
        depth: Depth,
        ply: usize,
        alpha: Value,
        beta: Value,
    ) -> NodeResult<R::Move> {
        // ルートの子はどの深さでもよい
        let required = if ply == 1 { Depth::MIN } else { depth };
        match self.tt.read(key, required, alpha, beta) {
            TtRead::Deeper { score, best_move, .. }
            | TtRead::QuiescenceDeeper { score, best_move, .. }
                if self.playable(pos, best_move) =>
            {
                self.stats.cancelled_hits += 1;
                self.cached(ply, score, best_move, Window { alpha, beta })
            }
            _ => {
                self.stats.cancelled_nodes += 1;
                NodeResult::unreliable(self.config.history_capacity)
            }
        }
    }

    /// 置換表を引き、答えか（狭めた窓と）指し手リストに変換する
    ///
    /// キャスリング権とアンパッサンはキーに含まれないので、置換表から取り出したものは
    /// まず合法性を確かめ、合わなければ捨てる。
    fn consult_table(
        &mut self,
        pos: &R::Position,
        key: u64,
        depth: Depth,
        ply: usize,
        window: Window,
    ) -> TableStep<R::Move> {
        self.stats.tt_reads += 1;
        let keep = |cached: Option<CachedMoves<R::Move>>| TableStep::Continue { cached, window };
        match self.tt.read(key, depth, window.alpha, window.beta) {
            TtRead::Deeper { score, best_move, bound, .. } if self.playable(pos, best_move) => {
                self.stats.record_hit(bound);
                TableStep::Done(self.cached(ply, score, best_move, window))
            }
            TtRead::QuiescenceDeeper { score, best_move, bound, .. }
                if depth <= 0 && self.playable(pos, best_move) =>
            {
                self.stats.record_hit(bound);
                TableStep::Done(self.cached(ply, score, best_move, window))
            }
            TtRead::Narrowed { score, bound, moves, .. }
                if (depth <= 0 || !bound.is_quiescence())
                    && moves.as_deref().is_none_or(|m| self.all_legal(pos, m)) =>
            {
                self.stats.tt_narrowed += 1;
                let narrowed = if bound.is_lower() {
                    Window { alpha: score, ..window }
                } else {
                    Window { beta: score, ..window }
                };
                let quiescence = bound.is_quiescence();
                TableStep::Continue {
                    cached: moves.map(|moves| CachedMoves { moves, quiescence }),
                    window: narrowed,
                }
            }
            TtRead::SavedMoves { moves, .. } if self.all_legal(pos, &moves) => {
                self.stats.tt_move_hints += 1;
                keep(Some(CachedMoves { moves, quiescence: false }))
            }
            TtRead::QuiescenceSavedMoves { moves, .. }
                if depth <= 0 && self.all_legal(pos, &moves) =>
            {
                self.stats.tt_move_hints += 1;
                keep(Some(CachedMoves { moves, quiescence: true }))
            }
            _ => keep(None),
        }
    }

    #[inline]
    fn playable(&self, pos: &R::Position, mv: Option<R::Move>) -> bool {
        mv.is_none_or(|m| self.rules.is_legal(pos, m))
    }

    #[inline]
    fn all_legal(&self, pos: &R::Position, moves: &[R::Move]) -> bool {
        moves.iter().all(|&m| self.rules.is_legal(pos, m))
    }

    fn cached(
        &self,
        ply: usize,
        score: Value,
        best_move: Option<R::Move>,
        window: Window,
    ) -> NodeResult<R::Move> {
        let mut line = SearchHistory::new(self.config.history_capacity);
        line.record(ply, best_move.map_or(LineEntry::Edge, LineEntry::Cached));
        NodeResult {
            best_move,
            value: window.clamp(score),
            line,
            unreliable: false,
        }
    }

    /// ここで止めて差分評価値を返す（確定値として保存する）
    fn end_at_edge(
        &mut self,
        key: u64,
        depth: Depth,
        ply: usize,
        window: Window,
        prior: Value,
    ) -> NodeResult<R::Move> {
        self.store(key, depth, Bound::Edge, prior, None, None);
        self.edge_result(ply, window.clamp(prior))
    }

    fn edge_result(&self, ply: usize, value: Value) -> NodeResult<R::Move> {
        let mut line = SearchHistory::new(self.config.history_capacity);
        line.record(ply, LineEntry::Edge);
        NodeResult {
            best_move: None,
            value,
            line,
            unreliable: false,
        }
    }

    fn store(
        &mut self,
        key: u64,
        depth: Depth,
        bound: Bound,
        score: Value,
        best_move: Option<R::Move>,
        moves: Option<Vec<R::Move>>,
    ) {
        // 期限後に出した結果は飛ばした子に依存しうる
        if self.cancelled {
            return;
        }
        #[cfg(feature = "search-trace")]
        log::trace!("tt store key={key:#018x} depth={depth} bound={bound:?} score={score}");
        self.stats.tt_writes += 1;
        self.tt.write(key, depth, bound, score, best_move, moves);
    }

    // =========================================================================
    // 展開
    // =========================================================================

    /// 並べ済みの `moves` に対する通常のαβ
    ///
    /// `window` で子を探索し、結果の境界種別は呼び出し側の窓 `caller` で判定する。
    /// 置換表で窓を狭めたとき、狭めた端で止まった値は確定値になる。
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        pos: &R::Position,
        key: u64,
        depth: Depth,
        ply: usize,
        window: Window,
        caller: Window,
        maximizing: bool,
        moves: Vec<R::Move>,
        prior: Value,
    ) -> NodeResult<R::Move> {
        let Window { mut alpha, mut beta } = window;
        let mut best: Option<(R::Move, Value, SearchHistory<R::Move>)> = None;
        let mut measured: Vec<(Value, R::Move)> = Vec::with_capacity(moves.len());
        let mut skipped: Vec<R::Move> = Vec::new();
        let mut forced_break = false;

        for (i, &mv) in moves.iter().enumerate() {
            let child = self.rules.apply_move(pos, mv);
            let child_prior =
                self.evaluator.evaluate(&self.rules, prior, pos, &child, mv, maximizing);
            let result =
                self.search_node(&child, depth - 1, ply + 1, alpha, beta, !maximizing, child_prior);
            if result.unreliable {
                skipped.push(mv);
                continue;
            }

            let value = result.value;
            measured.push((value, mv));
            let improves = match &best {
                None => true,
                Some((_, best_value, _)) if maximizing => value > *best_value,
                Some((_, best_value, _)) => value < *best_value,
            };
            if improves {
                best = Some((mv, value, result.line));
            }

            let forced = if maximizing { value.is_win() } else { value.is_loss() };
            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if alpha >= beta || forced {
                forced_break = forced;
                self.stats.cutoffs += 1;
                skipped.extend_from_slice(&moves[i + 1..]);
                break;
            }
        }

        let Some((best_move, best_value, mut line)) = best else {
            // 全ての子が期限で打ち切られた
            return NodeResult::unreliable(self.config.history_capacity);
        };
        line.record(ply, LineEntry::Searched(best_move));

        let bound = settled_bound(best_value, caller, maximizing, forced_break);

        // 測った手を良い順に、測らなかった手は元の順で後ろに
        if maximizing {
            measured.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            measured.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let reordered: Vec<R::Move> =
            measured.iter().map(|&(_, mv)| mv).chain(skipped).collect();
        self.store(key, depth, bound, best_value, Some(best_move), Some(reordered));

        NodeResult {
            best_move: Some(best_move),
            value: window.clamp(best_value),
            line,
            unreliable: false,
        }
    }

    /// 駒取り・成り `moves` に対する静止探索
    ///
    /// 差分評価値が stand-pat の値で、手番側はそれより良い手だけを選ぶ。stand-pat で窓の外に
    /// 出るノードは呼び出し前に返しているので、ここでは stand-pat が窓の片側を引き締める。
    #[allow(clippy::too_many_arguments)]
    fn quiescence(
        &mut self,
        pos: &R::Position,
        key: u64,
        depth: Depth,
        ply: usize,
        window: Window,
        caller: Window,
        maximizing: bool,
        prior: Value,
        moves: Vec<R::Move>,
    ) -> NodeResult<R::Move> {
        let Window { mut alpha, mut beta } = window;
        if maximizing {
            alpha = alpha.max(prior);
        } else {
            beta = beta.min(prior);
        }
        let mut best_value = prior;
        let mut best: Option<(R::Move, SearchHistory<R::Move>)> = None;
        let mut any_reliable = false;
        let mut forced_break = false;

        for &mv in &moves {
            let child = self.rules.apply_move(pos, mv);
            let child_prior =
                self.evaluator.evaluate(&self.rules, prior, pos, &child, mv, maximizing);
            let result =
                self.search_node(&child, depth - 1, ply + 1, alpha, beta, !maximizing, child_prior);
            if result.unreliable {
                continue;
            }
            any_reliable = true;

            let value = result.value;
            let improves = if maximizing { value > best_value } else { value < best_value };
            if improves {
                best_value = value;
                best = Some((mv, result.line));
            }

            let forced = if maximizing { value.is_win() } else { value.is_loss() };
            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if alpha >= beta || forced {
                forced_break = forced;
                self.stats.cutoffs += 1;
                break;
            }
        }

        if !any_reliable {
            return NodeResult::unreliable(self.config.history_capacity);
        }
        let bound = settled_bound(best_value, caller, maximizing, forced_break).into_quiescence();
        let Some((best_move, mut line)) = best else {
            if bound == Bound::Quiescence {
                // どの駒取りも stand-pat に及ばない
                return self.end_at_edge(key, depth, ply, caller, prior);
            }
            self.store(key, depth, bound, best_value, None, Some(moves));
            return self.edge_result(ply, window.clamp(best_value));
        };
        line.record(ply, LineEntry::Quiescence(best_move));
        self.store(key, depth, bound, best_value, Some(best_move), Some(moves));

        NodeResult {
            best_move: Some(best_move),
            value: window.clamp(best_value),
            line,
            unreliable: false,
        }
    }
}

/// 展開し終えたノードの境界種別
///
/// fail-hard の値を呼び出し側の窓で分類する。勝ち・負けを見つけて残りを打ち切ったときは、
/// より良い手が残っているかもしれないので片側の境界にとどめる。
fn settled_bound(value: Value, caller: Window, maximizing: bool, forced_break: bool) -> Bound {
    match (forced_break, maximizing) {
        (true, true) => Bound::LowerBound,
        (true, false) => Bound::UpperBound,
        (false, _) => Bound::classify(value, caller.alpha, caller.beta),
    }
}
