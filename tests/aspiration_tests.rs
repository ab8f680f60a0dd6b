//! Aspiration windows must converge on the same result a full-window
//! search produces, including when the score jumps outside the window.

use std::str::FromStr;
use stratus::board::Board;
use stratus::moves::magic::loader::load_magic_tables;
use stratus::search::context::SearchContext;
use stratus::search::eval::Classical;
use stratus::search::repetition::RepetitionStack;
use stratus::search::search::{PLUS_MATE, search};

fn search_with(fen: &str, depth: i32, aspiration: bool) -> (i32, Option<String>) {
    let tables = load_magic_tables();
    let mut board = Board::from_str(fen).expect("valid FEN");
    let mut ctx = SearchContext::new(16);
    ctx.use_aspiration = aspiration;
    let mut rep = RepetitionStack::new();
    let (score, best) = search(&mut board, &tables, &Classical, &mut ctx, &mut rep, depth, None);
    (score, best.map(|m| m.to_uci()))
}

#[test]
fn windowed_and_full_width_agree_on_quiet_position() {
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";
    let (windowed_score, windowed_best) = search_with(fen, 6, true);
    let (full_score, full_best) = search_with(fen, 6, false);

    assert!(windowed_best.is_some() && full_best.is_some());
    // window-dependent pruning may drift the score a handful of
    // centipawns; the verdict must not change
    assert!(
        (windowed_score - full_score).abs() <= 30,
        "windowed {} vs full {}",
        windowed_score,
        full_score
    );
}

#[test]
fn fail_high_researches_still_find_the_mate() {
    // The mate score explodes out of any 100cp window at depth 6, forcing
    // fail-high re-searches before the final score settles.
    let fen = "6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1";
    let (score, best) = search_with(fen, 6, true);
    assert_eq!(best, Some("e1e8".to_string()));
    assert!(score > PLUS_MATE);

    let (full_score, full_best) = search_with(fen, 6, false);
    assert_eq!(score, full_score, "mate scores are window-independent");
    assert_eq!(best, full_best);
}

#[test]
fn lopsided_scores_stay_inside_the_final_window() {
    // White is a queen down; the windowed and full-width searches must
    // reach the same verdict far from the aspiration center.
    let fen = "rnb1kbnr/pppp1ppp/8/8/3q4/8/PPP1PPPP/RNB1KBNR w KQkq - 0 4";
    let (score, best) = search_with(fen, 6, true);
    let (full_score, full_best) = search_with(fen, 6, false);

    assert!(best.is_some() && full_best.is_some());
    assert!(
        (score - full_score).abs() <= 30,
        "windowed {} vs full {}",
        score,
        full_score
    );
    assert!(score < -500, "white is a queen down, got {}", score);
}
