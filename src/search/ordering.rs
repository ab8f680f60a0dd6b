use crate::board::{Board, Piece};
use crate::moves::types::Move;

/// The transposition-table suggestion always sorts first.
pub const HASH_MOVE_SCORE: i32 = 100_000;

/// Killer slots sit just below the cheapest capture (pawn takes queen
/// scores 16·100 − 950 = 650).
pub const KILLER_PRIMARY: i32 = 600;
pub const KILLER_SECONDARY: i32 = 590;

/// Most-valuable-victim / least-valuable-attacker score; promotions add
/// the promoted piece's worth on top.
#[inline]
pub fn mvv_lva(board: &Board, mv: &Move) -> i32 {
    let mut score = 0;

    if mv.is_capture() {
        let victim = if mv.is_en_passant() {
            Piece::Pawn
        } else {
            // capture flag guarantees an occupant
            board.piece_type_at(mv.to).unwrap_or(Piece::Pawn)
        };
        score += 16 * victim.value() - mv.piece.value();
    }

    if let Some(promoted) = mv.promotion {
        score += promoted.value();
    }

    score
}

/// Assign ordering scores for a full-width node: hash move, captures by
/// MVV/LVA, killer slots, then quiet history.
pub fn assign_scores(
    board: &Board,
    moves: &mut [Move],
    hash_move: Option<Move>,
    killers: &[Option<Move>; 2],
    history: &[[i32; 64]; 64],
) {
    for mv in moves.iter_mut() {
        if let Some(hm) = hash_move {
            if mv.same_action(&hm) {
                mv.score = HASH_MOVE_SCORE;
                continue;
            }
        }

        if mv.is_capture() || mv.is_promotion() {
            mv.score = mvv_lva(board, mv);
            continue;
        }

        if killers[0].is_some_and(|k| mv.same_action(&k)) {
            mv.score = KILLER_PRIMARY;
        } else if killers[1].is_some_and(|k| mv.same_action(&k)) {
            mv.score = KILLER_SECONDARY;
        } else {
            mv.score = history[mv.from.index() as usize][mv.to.index() as usize];
        }
    }
}

/// Quiescence ordering: captures and promotions only, MVV/LVA alone.
pub fn assign_scores_quiesce(board: &Board, moves: &mut [Move]) {
    for mv in moves.iter_mut() {
        mv.score = mvv_lva(board, mv);
    }
}

/// Insertion sort by descending score. Move lists are short enough that
/// this beats the library sort and keeps equal-score generation order.
pub fn sort_moves(moves: &mut [Move]) {
    for i in 1..moves.len() {
        let current = moves[i];
        let mut j = i;
        while j > 0 && moves[j - 1].score < current.score {
            moves[j] = moves[j - 1];
            j -= 1;
        }
        moves[j] = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::execute::generate_legal;
    use crate::moves::magic::loader::load_magic_tables;
    use crate::moves::types::Move;
    use std::str::FromStr;

    fn legal_moves(fen: &str) -> (Board, Vec<Move>) {
        let mut board = Board::from_str(fen).unwrap();
        let tables = load_magic_tables();
        let mut moves = Vec::with_capacity(64);
        let mut scratch = Vec::with_capacity(256);
        generate_legal(&mut board, &tables, &mut moves, &mut scratch);
        (board, moves)
    }

    #[test]
    fn sort_is_descending_and_stable_for_ties() {
        let mut moves = Vec::new();
        let (_, generated) = legal_moves("4k3/8/8/8/8/8/8/4K2R w - - 0 1");
        for (i, mut mv) in generated.into_iter().enumerate() {
            mv.score = (i as i32 % 3) * 10;
            moves.push(mv);
        }
        sort_moves(&mut moves);
        for pair in moves.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn pawn_takes_queen_outranks_queen_takes_pawn() {
        // White pawn on b4 can take the queen on c5; white queen on h5
        // can take the pawn on h7.
        let (board, moves) =
            legal_moves("3k4/7p/8/2q4Q/1P6/8/8/3K4 w - - 0 1");
        let pawn_takes = moves
            .iter()
            .find(|m| m.piece == Piece::Pawn && m.is_capture())
            .expect("bxc5 available");
        let queen_takes = moves
            .iter()
            .find(|m| m.piece == Piece::Queen && m.is_capture())
            .expect("Qxh7 available");
        assert!(mvv_lva(&board, pawn_takes) > mvv_lva(&board, queen_takes));
    }

    #[test]
    fn hash_move_sorts_first() {
        let (board, mut moves) = legal_moves(
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1",
        );
        let hash_move = moves[moves.len() - 1];
        let killers = [None, None];
        let history = [[0; 64]; 64];
        assign_scores(&board, &mut moves, Some(hash_move), &killers, &history);
        sort_moves(&mut moves);
        assert!(moves[0].same_action(&hash_move));
        assert_eq!(moves[0].score, HASH_MOVE_SCORE);
    }

    #[test]
    fn killers_rank_between_captures_and_quiets() {
        let (board, mut moves) =
            legal_moves("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1");
        let killer = moves
            .iter()
            .copied()
            .find(|m| m.is_quiet())
            .expect("some quiet move");
        let killers = [Some(killer), None];
        let history = [[0; 64]; 64];
        assign_scores(&board, &mut moves, None, &killers, &history);
        sort_moves(&mut moves);

        let capture_pos = moves.iter().position(|m| m.is_capture()).unwrap();
        let killer_pos = moves.iter().position(|m| m.same_action(&killer)).unwrap();
        let other_quiet_pos = moves
            .iter()
            .position(|m| m.is_quiet() && !m.same_action(&killer))
            .unwrap();
        assert!(capture_pos < killer_pos);
        assert!(killer_pos < other_quiet_pos);
    }
}
