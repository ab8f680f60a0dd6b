use crate::bitboard::BitboardExt;
use crate::board::{Board, Color, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::magic::attacks::{KING_ATTACKS, KNIGHT_ATTACKS, pawn_attacks};
use crate::moves::types::{
    CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KINGSIDE_CASTLE, Move, MoveBuffer, PROMOTION,
    PROMOTION_CAPTURE, QUEENSIDE_CASTLE, QUIET_MOVE,
};
use crate::square::Square;
use crate::utils::pop_lsb;

const RANK_1: u64 = 0x0000_0000_0000_00FF;
const RANK_2: u64 = 0x0000_0000_0000_FF00;
const RANK_7: u64 = 0x00FF_0000_0000_0000;
const RANK_8: u64 = 0xFF00_0000_0000_0000;

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;

const WHITE_KINGSIDE_BETWEEN: u64 = 0x0000_0000_0000_0060;
const WHITE_QUEENSIDE_BETWEEN: u64 = 0x0000_0000_0000_000E;
const BLACK_KINGSIDE_BETWEEN: u64 = 0x6000_0000_0000_0000;
const BLACK_QUEENSIDE_BETWEEN: u64 = 0x0E00_0000_0000_0000;

const PROMOS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

#[inline(always)]
fn push_piece_moves(
    from: u8,
    mut targets: u64,
    enemy: u64,
    piece: Piece,
    move_list: &mut impl MoveBuffer,
) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        let flags = if enemy.is_set(to) { CAPTURE } else { QUIET_MOVE };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            piece,
            flags,
        ));
    }
}

#[inline(always)]
fn push_captures_only(
    from: u8,
    targets: u64,
    enemy: u64,
    piece: Piece,
    move_list: &mut impl MoveBuffer,
) {
    let mut caps = targets & enemy;
    while caps != 0 {
        let to = pop_lsb(&mut caps);
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            piece,
            CAPTURE,
        ));
    }
}

fn generate_knight_moves(board: &Board, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;

    let mut bb = board.pieces(Piece::Knight, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = KNIGHT_ATTACKS[from as usize] & !friendly & !enemy_king;
        push_piece_moves(from, targets, enemy, Piece::Knight, move_list);
    }
}

fn generate_slider_moves(board: &Board, tables: &MagicTables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;
    let blockers = board.occupied();

    let mut bishops = board.pieces(Piece::Bishop, color);
    while bishops != 0 {
        let from = pop_lsb(&mut bishops);
        let attacks = tables.bishop.get_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, enemy, Piece::Bishop, move_list);
    }

    let mut rooks = board.pieces(Piece::Rook, color);
    while rooks != 0 {
        let from = pop_lsb(&mut rooks);
        let attacks = tables.rook.get_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, enemy, Piece::Rook, move_list);
    }

    let mut queens = board.pieces(Piece::Queen, color);
    while queens != 0 {
        let from = pop_lsb(&mut queens);
        let attacks = tables.queen_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, enemy, Piece::Queen, move_list);
    }
}

fn generate_king_moves(board: &Board, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let king_bb = board.pieces(Piece::King, color);
    debug_assert!(king_bb != 0);

    let from = king_bb.trailing_zeros() as u8;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;

    let targets = KING_ATTACKS[from as usize] & !friendly & !enemy_king;
    push_piece_moves(from, targets, enemy, Piece::King, move_list);

    // Castling: generated when the right is held and the path is empty.
    // Check/through-check legality is enforced by the legality filter.
    let occ = board.occupied();
    let (ks_between, qs_between) = match color {
        Color::White => (WHITE_KINGSIDE_BETWEEN, WHITE_QUEENSIDE_BETWEEN),
        Color::Black => (BLACK_KINGSIDE_BETWEEN, BLACK_QUEENSIDE_BETWEEN),
    };

    if board.has_kingside_castle(color) && occ & ks_between == 0 {
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(from + 2),
            Piece::King,
            KINGSIDE_CASTLE,
        ));
    }
    if board.has_queenside_castle(color) && occ & qs_between == 0 {
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(from - 2),
            Piece::King,
            QUEENSIDE_CASTLE,
        ));
    }
}

fn generate_pawn_moves(board: &Board, move_list: &mut impl MoveBuffer, captures_only: bool) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;
    let empty = !board.occupied();

    // promo_rank is the destination rank; last_rank holds the pawns that
    // are one step from promoting.
    let (last_rank, promo_rank) = match color {
        Color::White => (RANK_7, RANK_8),
        Color::Black => (RANK_2, RANK_1),
    };

    if !captures_only {
        // Quiet single pushes, promotions excluded.
        let single_pushes = match color {
            Color::White => (pawns << 8) & empty & !promo_rank,
            Color::Black => (pawns >> 8) & empty & !promo_rank,
        };
        let mut bb = single_pushes;
        while bb != 0 {
            let to = pop_lsb(&mut bb);
            let from = match color {
                Color::White => to - 8,
                Color::Black => to + 8,
            };
            move_list.push(Move::new(
                Square::from_index(from),
                Square::from_index(to),
                Piece::Pawn,
                QUIET_MOVE,
            ));
        }

        // Double pushes from the starting rank.
        let double_pushes = match color {
            Color::White => ((((pawns & RANK_2) << 8) & empty) << 8) & empty,
            Color::Black => ((((pawns & RANK_7) >> 8) & empty) >> 8) & empty,
        };
        let mut bb = double_pushes;
        while bb != 0 {
            let to = pop_lsb(&mut bb);
            let from = match color {
                Color::White => to - 16,
                Color::Black => to + 16,
            };
            move_list.push(Move::new(
                Square::from_index(from),
                Square::from_index(to),
                Piece::Pawn,
                DOUBLE_PAWN_PUSH,
            ));
        }
    }

    // Normal captures, promotions excluded.
    let mut attackers = pawns & !last_rank;
    while attackers != 0 {
        let from = pop_lsb(&mut attackers);
        let mut targets = pawn_attacks(from, color) & enemy & !promo_rank;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            move_list.push(Move::new(
                Square::from_index(from),
                Square::from_index(to),
                Piece::Pawn,
                CAPTURE,
            ));
        }
    }

    // Promotion pushes.
    let promo_pushes = match color {
        Color::White => ((pawns & last_rank) << 8) & empty,
        Color::Black => ((pawns & last_rank) >> 8) & empty,
    };
    let mut bb = promo_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        for promo in PROMOS {
            move_list.push(Move::promo(
                Square::from_index(from),
                Square::from_index(to),
                promo,
                PROMOTION,
            ));
        }
    }

    // Promotion captures.
    let mut promo_attackers = pawns & last_rank;
    while promo_attackers != 0 {
        let from = pop_lsb(&mut promo_attackers);
        let mut targets = pawn_attacks(from, color) & enemy & promo_rank;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            for promo in PROMOS {
                move_list.push(Move::promo(
                    Square::from_index(from),
                    Square::from_index(to),
                    promo,
                    PROMOTION_CAPTURE,
                ));
            }
        }
    }

    // En passant. The board stores the advanced pawn's own square; the
    // capture lands on the square behind it.
    if let Some(ep_pawn) = board.en_passant {
        let enemy_pawns = board.pieces(Piece::Pawn, color.opposite());
        if enemy_pawns & ep_pawn.bitboard() != 0 {
            let target = match color {
                Color::White => ep_pawn.index() + 8,
                Color::Black => ep_pawn.index() - 8,
            };
            if empty & (1u64 << target) != 0 {
                let bb = ep_pawn.bitboard();
                let beside = ((bb & !FILE_H) << 1) | ((bb & !FILE_A) >> 1);
                let mut capturers = beside & pawns;
                while capturers != 0 {
                    let from = pop_lsb(&mut capturers);
                    move_list.push(Move::new(
                        Square::from_index(from),
                        Square::from_index(target),
                        Piece::Pawn,
                        EN_PASSANT,
                    ));
                }
            }
        }
    }
}

/// All pseudolegal moves for the side to move.
pub fn generate_pseudo_legal(board: &Board, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    moves.clear();
    generate_pawn_moves(board, moves, false);
    generate_knight_moves(board, moves);
    generate_slider_moves(board, tables, moves);
    generate_king_moves(board, moves);
}

/// Captures and promotions only, for quiescence.
pub fn generate_pseudo_quiesce(board: &Board, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    moves.clear();
    let color = board.side_to_move;
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;
    let friendly = board.occupancy(color);
    let blockers = board.occupied();

    generate_pawn_moves(board, moves, true);

    let mut knights = board.pieces(Piece::Knight, color);
    while knights != 0 {
        let from = pop_lsb(&mut knights);
        let targets = KNIGHT_ATTACKS[from as usize] & !friendly & !enemy_king;
        push_captures_only(from, targets, enemy, Piece::Knight, moves);
    }

    let mut bishops = board.pieces(Piece::Bishop, color);
    while bishops != 0 {
        let from = pop_lsb(&mut bishops);
        let attacks = tables.bishop.get_attacks(from as usize, blockers);
        push_captures_only(from, attacks & !friendly & !enemy_king, enemy, Piece::Bishop, moves);
    }

    let mut rooks = board.pieces(Piece::Rook, color);
    while rooks != 0 {
        let from = pop_lsb(&mut rooks);
        let attacks = tables.rook.get_attacks(from as usize, blockers);
        push_captures_only(from, attacks & !friendly & !enemy_king, enemy, Piece::Rook, moves);
    }

    let mut queens = board.pieces(Piece::Queen, color);
    while queens != 0 {
        let from = pop_lsb(&mut queens);
        let attacks = tables.queen_attacks(from as usize, blockers);
        push_captures_only(from, attacks & !friendly & !enemy_king, enemy, Piece::Queen, moves);
    }

    let king_bb = board.pieces(Piece::King, color);
    if king_bb != 0 {
        let from = king_bb.trailing_zeros() as u8;
        let targets = KING_ATTACKS[from as usize] & !friendly & !enemy_king;
        push_captures_only(from, targets, enemy, Piece::King, moves);
    }
}
