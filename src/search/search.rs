use crate::board::{Board, Piece};
use crate::moves::execute::{
    generate_legal, generate_quiesce, make_move, make_null_move, undo_move, undo_null_move,
};
use crate::moves::magic::MagicTables;
use crate::moves::masks::passed_cone;
use crate::moves::square_control::in_check;
use crate::moves::types::{Move, MoveList};
use crate::search::context::{MAX_PLY, SearchContext};
use crate::search::eval::{Evaluator, Wdl};
use crate::search::ordering::{assign_scores, assign_scores_quiesce, sort_moves};
use crate::search::repetition::RepetitionStack;
use crate::search::tt::Bound;
use crate::status::is_insufficient_material;
use std::time::Duration;
use tracing::debug;

pub const PLUS_MATE: i32 = 100_000;
pub const MINS_MATE: i32 = -PLUS_MATE;
const INF: i32 = 1 << 20;

/// Iterative deepening runs to this depth when only a time budget is given.
const DEFAULT_MAX_DEPTH: i32 = 99;

/// Null-move depth reduction.
const NULL_R: i32 = 3;
/// Passing the move is assumed to give away about this much.
const NULL_MARGIN: i32 = 13;

/// Static (reverse futility) pruning: margin per remaining ply, with a
/// ceiling that keeps near-mate evals out of the shortcut.
const STATIC_PRUNE_MARGIN: i32 = 116;
const STATIC_PRUNE_CEILING: i32 = 9000;

/// Aspiration window: initial half-width, growth, and retry cap.
const ASPIRATION_DELTA: i32 = 100;
const ASPIRATION_MIN_DEPTH: i32 = 6;
const MAX_RESEARCHES: usize = 5;

/// Ordering score below which a first move counts as "weak" and the
/// expensive re-sort kicks in.
const EXPENSIVE_SORT_TRIGGER: i32 = 290;

/// Mate score seen from a node `height` plies from the root. Closer mates
/// score higher, so the search prefers the shortest one.
#[inline(always)]
pub fn mate(height: i32) -> i32 {
    PLUS_MATE + 100 - height
}

/// Futility margin per remaining depth: a minor, a rook, a queen.
#[inline(always)]
fn futility_margin(depth: i32) -> i32 {
    match depth {
        1 => Piece::Bishop.value(),
        2 => Piece::Rook.value(),
        3 => Piece::Queen.value(),
        _ => 0,
    }
}

/// Shift mate scores to node-relative distance before storing.
#[inline(always)]
fn score_to_tt(score: i32, height: i32) -> i32 {
    if score > PLUS_MATE {
        score + height
    } else if score < MINS_MATE {
        score - height
    } else {
        score
    }
}

/// Undo the node-relative shift when loading.
#[inline(always)]
fn score_from_tt(score: i32, height: i32) -> i32 {
    if score > PLUS_MATE {
        score - height
    } else if score < MINS_MATE {
        score + height
    } else {
        score
    }
}

fn format_score(score: i32) -> String {
    if score >= PLUS_MATE {
        let plies = PLUS_MATE + 100 - score;
        format!("mate {}", (plies + 1) / 2)
    } else if score <= MINS_MATE {
        let plies = PLUS_MATE + 100 + score;
        format!("mate -{}", (plies + 1) / 2)
    } else {
        format!("cp {}", score)
    }
}

/// Drawn child test inside the move loop, entered with the move already
/// made. A capture can only have produced a dead position; a reversible
/// move is checked against the fifty-move clock and the line's ancestors.
#[inline]
fn is_search_draw(board: &Board, rep: &RepetitionStack, was_capture: bool) -> bool {
    if was_capture {
        is_insufficient_material(board)
    } else {
        board.halfmove_clock >= 100 || (rep.len() > 3 && rep.is_twofold(board.zobrist))
    }
}

/// A pawn push that lands past the middlegame line with no enemy pawn in
/// its cone. Entered with the move already made, so the mover is the side
/// not on turn.
#[inline]
fn is_advanced_passer_push(board: &Board, mv: Move) -> bool {
    use crate::board::Color;
    let mover = board.side_to_move.opposite();
    let enemy_pawns = board.pieces(Piece::Pawn, board.side_to_move);
    let to = mv.to.index();
    match mover {
        Color::White => to > 39 && passed_cone(Color::White, to) & enemy_pawns == 0,
        Color::Black => to < 24 && passed_cone(Color::Black, to) & enemy_pawns == 0,
    }
}

/// Iterative-deepening driver. Returns the score and best move of the
/// last fully completed depth; emits one info line per depth.
///
/// `target_depth <= 0` means "until the clock runs out" (capped at
/// `DEFAULT_MAX_DEPTH`). `rep` carries the game line so far and is used
/// to recognize repetitions against positions before the root.
pub fn search(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    rep: &mut RepetitionStack,
    target_depth: i32,
    budget: Option<Duration>,
) -> (i32, Option<Move>) {
    ctx.begin_search(budget);
    let target = if target_depth <= 0 {
        DEFAULT_MAX_DEPTH
    } else {
        target_depth.min(DEFAULT_MAX_DEPTH)
    };

    let mut list = MoveList::new();
    let mut scratch = MoveList::new();
    generate_legal(board, tables, &mut list, &mut scratch);

    if list.is_empty() {
        return (0, None);
    }
    if list.len() == 1 {
        return (0, Some(list[0]));
    }

    assign_scores(board, &mut list, None, &[None, None], &ctx.history);
    sort_moves(&mut list);

    let mut best_move = list[0];
    let mut best_score = 0;

    for depth in 1..=target {
        let mut delta = ASPIRATION_DELTA;
        let mut alpha = -INF;
        let mut beta = INF;
        if ctx.use_aspiration && depth >= ASPIRATION_MIN_DEPTH {
            alpha = best_score - delta;
            beta = best_score + delta;
        }

        let mut score = best_score;
        let mut mv = best_move;
        for _ in 0..MAX_RESEARCHES {
            let (s, m) = root_search(board, tables, eval, ctx, rep, &mut list, depth, alpha, beta);
            sort_moves(&mut list);
            if ctx.abort {
                break;
            }
            score = s;
            mv = m;

            if score >= beta {
                // fail high: raise the ceiling, widen faster each time
                beta += delta;
                delta += delta / 4;
            } else if score <= alpha {
                // fail low: pull beta toward the midpoint, drop the floor
                beta = (alpha + beta) / 2;
                alpha -= delta;
                delta += delta / 4;
            } else {
                break;
            }
        }

        if ctx.abort {
            // the interrupted depth is untrusted; keep the previous one
            break;
        }

        best_score = score;
        best_move = mv;

        println!(
            "info depth {} score {} nodes {} time {} pv {}",
            depth,
            format_score(best_score),
            ctx.nodes,
            ctx.elapsed().as_millis(),
            best_move
        );
        debug!(depth, score = best_score, nodes = ctx.nodes, "depth complete");

        if best_score >= PLUS_MATE || ctx.past_soft_limit() {
            break;
        }
    }

    (best_score, Some(best_move))
}

/// One depth over the (persistently ordered) root move list. Writes each
/// move's score back into the list so the next iteration starts from the
/// refined ordering.
#[allow(clippy::too_many_arguments)]
fn root_search(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    rep: &mut RepetitionStack,
    list: &mut [Move],
    depth: i32,
    mut alpha: i32,
    beta: i32,
) -> (i32, Move) {
    let mut best_move = list[0];
    let mut best = -INF;
    let total = list.len();

    // The stack holds every position up to and including the root, so
    // deeper nodes can recognize lines that cycle back here.
    rep.push(board.zobrist);

    for i in 0..total {
        ctx.root_progress = i as f32 / total as f32;
        let mv = list[i];

        let undo = make_move(board, mv);
        let val;
        if is_insufficient_material(board) || rep.is_threefold(board.zobrist) {
            val = 0;
        } else {
            rep.push(board.zobrist);
            if i == 0 {
                val = -pv_search(
                    board, tables, eval, ctx, rep, -beta, -alpha, depth - 1, 1, false,
                );
            } else {
                let mut v = -pv_search(
                    board, tables, eval, ctx, rep, -alpha - 1, -alpha, depth - 1, 1, false,
                );
                if v > alpha {
                    v = -pv_search(
                        board, tables, eval, ctx, rep, -beta, -alpha, depth - 1, 1, false,
                    );
                }
                val = v;
            }
            rep.pop();
        }
        undo_move(board, undo);

        if ctx.abort {
            rep.pop();
            return (best, best_move);
        }

        // persists into the next iteration's ordering
        list[i].score = val;

        if val > best {
            best = val;
        }
        if val > alpha {
            best_move = mv;
            alpha = val;
            if val >= beta {
                break;
            }
        }
    }

    rep.pop();
    (best, best_move)
}

/// Principal-variation search, negamax and fail-soft. Returns a score
/// from the side to move's perspective; a raised abort flag makes every
/// frame return the sentinel 0, which the root discards.
#[allow(clippy::too_many_arguments)]
fn pv_search(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    rep: &mut RepetitionStack,
    mut alpha: i32,
    mut beta: i32,
    mut depth: i32,
    height: i32,
    in_null: bool,
) -> i32 {
    ctx.nodes += 1;
    ctx.check_time();
    if ctx.abort {
        return 0;
    }

    let pv = beta - alpha > 1;
    let hash = board.zobrist;

    // Optional oracle: exact win/draw/loss when few enough pieces remain.
    if let Some(tb) = &ctx.tablebase {
        if tb.in_range(board) {
            match tb.probe_wdl(board) {
                Wdl::Win => return mate(height) - 20,
                Wdl::Loss => return -(mate(height) - 20),
                Wdl::Draw => return 0,
                Wdl::Unknown => {}
            }
        }
    }

    let in_check_now = in_check(board, board.side_to_move, tables);

    // Checks get one extra ply; otherwise the horizon hands off to
    // quiescence.
    if in_check_now {
        depth += 1;
    } else if depth <= 0 {
        return quiescence(board, tables, eval, ctx, alpha, beta, height);
    }

    let mut hash_move = None;
    if let Some(entry) = ctx.tt.probe(hash) {
        hash_move = entry.best_move;
        if height > 3 && entry.depth >= depth {
            let val = score_from_tt(entry.value, height);
            match entry.bound {
                Bound::Exact => return val,
                Bound::Lower => alpha = alpha.max(val),
                Bound::Upper => beta = beta.min(val),
            }
            if alpha >= beta {
                return val;
            }
        }
    }

    let ev = eval.static_score(board);
    let own = board.side_to_move;
    let zugzwang_prone =
        (board.occupancy(own) ^ board.pieces(Piece::Pawn, own)).count_ones() <= 2;
    let is_safe = !in_check_now && !zugzwang_prone;

    if is_safe {
        // Static pruning: far enough above beta that shallow search is
        // not going to change the verdict.
        if !pv
            && depth <= 4
            && ev - STATIC_PRUNE_MARGIN * depth >= beta
            && ev < STATIC_PRUNE_CEILING
        {
            return ev;
        }

        if !in_null
            && depth > NULL_R
            && null_move_prunes(board, tables, eval, ctx, depth, beta, height)
        {
            if ctx.abort {
                return 0;
            }
            return beta;
        }
    }

    let mut list = MoveList::new();
    let mut scratch = MoveList::new();
    generate_legal(board, tables, &mut list, &mut scratch);

    if list.is_empty() {
        return if in_check_now { -mate(height) } else { 0 };
    }

    assign_scores(
        board,
        &mut list,
        hash_move,
        &ctx.killers_at(height as usize),
        &ctx.history,
    );
    sort_moves(&mut list);

    // When even the best-ranked move looks weak, buy better ordering with
    // shallow scout searches before committing to the full-depth loop.
    let mut exp_sort = false;
    if depth >= 5 && list[0].score < EXPENSIVE_SORT_TRIGGER {
        let targ = (if pv { depth - 4 } else { depth / 4 }).clamp(1, 6);
        expensive_sort(board, tables, eval, ctx, rep, &mut list, alpha, beta, targ, height);
        if ctx.abort {
            return 0;
        }
        exp_sort = true;
    }

    let orig_alpha = alpha;
    let mut best = -INF;
    let mut best_move = hash_move;

    // Futility: at frontier depths with a hopeless static eval, late weak
    // moves are not worth the visit.
    let can_break = depth <= 3 && ev + futility_margin(depth) <= alpha && is_safe;

    for i in 0..list.len() {
        let mv = list[i];

        if can_break && mv.score < 90 && (i as i32 > 3 + depth || (i > 3 && !pv)) {
            break;
        }

        let undo = make_move(board, mv);
        let val;
        if is_search_draw(board, rep, mv.is_capture()) {
            val = 0;
        } else {
            rep.push(board.zobrist);
            if i == 0 {
                val = -pv_search(
                    board, tables, eval, ctx, rep, -beta, -alpha, depth - 1, height + 1, in_null,
                );
            } else {
                let mut reduction = 1;
                if depth > 1 && !in_check(board, board.side_to_move, tables) {
                    if i > 4 && !mv.is_capture() {
                        reduction += 1 + depth / (3 + pv as i32);
                    }
                    if !pv && mv.piece == Piece::King && !mv.is_capture() {
                        reduction += 1;
                    }
                    if !exp_sort && pv && mv.score > 69 && mv.is_capture() {
                        reduction -= 1;
                    } else if mv.piece == Piece::Pawn && is_advanced_passer_push(board, mv) {
                        reduction -= 1;
                    }
                    reduction = reduction.min(depth);
                }

                let mut v = -pv_search(
                    board,
                    tables,
                    eval,
                    ctx,
                    rep,
                    -alpha - 1,
                    -alpha,
                    depth - reduction,
                    height + 1,
                    in_null,
                );
                if v > alpha {
                    v = -pv_search(
                        board, tables, eval, ctx, rep, -beta, -alpha, depth - 1, height + 1,
                        in_null,
                    );
                }
                val = v;
            }
            rep.pop();
        }
        undo_move(board, undo);

        if ctx.abort {
            return 0;
        }

        if val > best {
            best = val;
            best_move = Some(mv);
            if best > alpha {
                alpha = best;
                if alpha >= beta {
                    if !mv.is_capture() {
                        ctx.update_killer(height as usize, mv);
                        ctx.bump_history(mv, depth);
                    }
                    break;
                }
            }
        }
    }

    let bound = if best <= orig_alpha {
        Bound::Upper
    } else if best >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    ctx.tt
        .store(hash, best_move, score_to_tt(best, height), depth, bound);

    best
}

/// Null-move test: hand the opponent a free move and see whether they
/// still cannot reach `beta - MARGIN` with a reduced zero-window search.
/// The null subtree gets a fresh repetition line since passing breaks any
/// cycle.
fn null_move_prunes(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    depth: i32,
    beta: i32,
    height: i32,
) -> bool {
    let threshold = beta - NULL_MARGIN;
    let reduced = if depth < 6 {
        depth - NULL_R - 1
    } else {
        depth / 4 + 1
    };

    let undo = make_null_move(board);
    let mut null_line = RepetitionStack::new();
    let val = -pv_search(
        board,
        tables,
        eval,
        ctx,
        &mut null_line,
        -threshold,
        -threshold + 1,
        reduced,
        height + 1,
        true,
    );
    undo_null_move(board, undo);

    !ctx.abort && val >= threshold
}

/// Captures-and-promotions-only search past the horizon. Stands pat on
/// the static eval, delta-prunes hopeless nodes, and never writes to the
/// transposition table.
fn quiescence(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    mut alpha: i32,
    beta: i32,
    height: i32,
) -> i32 {
    ctx.nodes += 1;
    ctx.check_time();
    if ctx.abort {
        return 0;
    }

    let ev = eval.static_score(board);
    if ev >= beta {
        return beta;
    }
    if ev > alpha {
        alpha = ev;
    } else if ev + Piece::Queen.value() <= alpha {
        // even winning a queen cannot rescue this node
        return alpha;
    }

    if height as usize >= MAX_PLY {
        return alpha;
    }

    let mut list = MoveList::new();
    let mut scratch = MoveList::new();
    generate_quiesce(board, tables, &mut list, &mut scratch);

    assign_scores_quiesce(board, &mut list);
    sort_moves(&mut list);

    for i in 0..list.len() {
        let mv = list[i];

        // Remaining captures are trivial and the eval is far under alpha.
        if i > 2 && mv.score < 60 && ev + 145 <= alpha {
            break;
        }

        let undo = make_move(board, mv);
        let val = if is_insufficient_material(board) {
            0
        } else {
            -quiescence(board, tables, eval, ctx, -beta, -alpha, height + 1)
        };
        undo_move(board, undo);

        if ctx.abort {
            return 0;
        }

        if val >= beta {
            return beta;
        }
        if val > alpha {
            alpha = val;
        }
    }

    alpha
}

/// Score every move with a shallow scout search and re-sort. Used when
/// normal ordering has no strong candidate; no assumptions are made about
/// the incoming order.
#[allow(clippy::too_many_arguments)]
fn expensive_sort(
    board: &mut Board,
    tables: &MagicTables,
    eval: &dyn Evaluator,
    ctx: &mut SearchContext,
    rep: &mut RepetitionStack,
    list: &mut [Move],
    alpha: i32,
    beta: i32,
    depth: i32,
    height: i32,
) {
    for i in 0..list.len() {
        let mv = list[i];
        let undo = make_move(board, mv);
        let val;
        if is_search_draw(board, rep, mv.is_capture()) {
            val = 0;
        } else {
            rep.push(board.zobrist);
            val = -pv_search(
                board,
                tables,
                eval,
                ctx,
                rep,
                -beta - 1,
                -alpha + 1,
                depth - 1,
                height + 1,
                true,
            );
            rep.pop();
        }
        undo_move(board, undo);
        list[i].score = val;

        if ctx.abort {
            return;
        }
    }
    sort_moves(list);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_shrink_with_height() {
        assert!(mate(1) > mate(2));
        assert!(mate(1) > PLUS_MATE);
    }

    #[test]
    fn tt_mate_adjustment_round_trips() {
        let found_at_height_5 = mate(7); // mate two plies below
        let stored = score_to_tt(found_at_height_5, 5);
        // reloaded at a different height, the distance stays relative
        let reloaded = score_from_tt(stored, 9);
        assert_eq!(reloaded, mate(11));
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(25), "cp 25");
        assert_eq!(format_score(mate(1)), "mate 1"); // mate in one ply
        assert_eq!(format_score(mate(3)), "mate 2");
        assert_eq!(format_score(-mate(2)), "mate -1");
    }

    #[test]
    fn futility_margins_scale_by_piece() {
        assert_eq!(futility_margin(1), 335);
        assert_eq!(futility_margin(2), 525);
        assert_eq!(futility_margin(3), 950);
        assert_eq!(futility_margin(4), 0);
    }
}
