//! Draw detection through the search: repetition, fifty-move rule and
//! dead positions all fold into a zero score.

use std::str::FromStr;
use stratus::board::Board;
use stratus::moves::execute::{find_uci_move, make_move};
use stratus::moves::magic::loader::load_magic_tables;
use stratus::search::context::SearchContext;
use stratus::search::eval::Classical;
use stratus::search::repetition::RepetitionStack;
use stratus::search::search::search;
use stratus::status::{is_fifty_move_draw, is_insufficient_material};

#[test]
fn fifty_move_rule_neutralizes_a_won_position() {
    // Black is hopelessly behind, but the clock already stands at 99:
    // every reversible continuation is an immediate draw.
    let fen = "7k/8/8/8/8/8/R7/1Q5K b - - 99 80";
    let tables = load_magic_tables();
    let mut board = Board::from_str(fen).unwrap();
    assert!(!is_fifty_move_draw(&board));

    let mut ctx = SearchContext::new(16);
    let mut rep = RepetitionStack::new();
    let (score, best) = search(&mut board, &tables, &Classical, &mut ctx, &mut rep, 3, None);
    assert!(best.is_some());
    assert_eq!(score, 0, "the fifty-move rule rescues black, got {}", score);
}

#[test]
fn threefold_repetition_is_seen_against_game_history() {
    // Build the game line Nf3 Nf6 Ng1 Ng8 Nf3 Nf6 Ng1 Ng8: the start
    // position has now occurred three times.
    let tables = load_magic_tables();
    let mut board = Board::new();
    let mut rep = RepetitionStack::new();

    for text in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = find_uci_move(&mut board, &tables, text).expect("legal shuffle");
        rep.push(board.zobrist);
        make_move(&mut board, mv);
    }

    // current position equals the starting position, seen twice before
    assert_eq!(board.zobrist, Board::new().zobrist);
    assert!(rep.is_threefold(board.zobrist));
}

#[test]
fn winning_side_avoids_the_threefold() {
    // White is a queen up. The game history is doctored so that checking
    // on a8 would complete a threefold; the engine must keep its winning
    // score by choosing any other continuation.
    let tables = load_magic_tables();
    let mut board = Board::from_str("7k/8/8/8/8/8/8/Q6K w - - 0 1").unwrap();

    let mut probe = board.clone();
    let check_move = find_uci_move(&mut probe, &tables, "a1a8").unwrap();
    make_move(&mut probe, check_move);

    let mut rep = RepetitionStack::new();
    rep.push(probe.zobrist);
    rep.push(probe.zobrist);

    let mut ctx = SearchContext::new(16);
    let (score, best) = search(&mut board, &tables, &Classical, &mut ctx, &mut rep, 4, None);
    let best = best.expect("a move").to_uci();
    assert_ne!(best, "a1a8", "that move only repeats");
    assert!(score > 500, "white stays winning, got {}", score);
}

#[test]
fn dead_material_draws_override_material_count() {
    // K+B vs K+B on the same color complex is dead even with kings apart.
    let board = Board::from_str("8/8/8/3kb3/8/8/8/2BK4 w - - 0 1").unwrap();
    assert!(is_insufficient_material(&board));

    let tables = load_magic_tables();
    let mut b = board.clone();
    let mut ctx = SearchContext::new(16);
    let mut rep = RepetitionStack::new();
    let (score, _) = search(&mut b, &tables, &Classical, &mut ctx, &mut rep, 4, None);
    assert_eq!(score, 0);
}
