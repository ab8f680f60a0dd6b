use crate::board::castle_bits::*;
use crate::board::{Board, Color, EMPTY_SQ, Piece};
use crate::hash::zobrist::{ep_file_to_hash, xor_castling_rights_delta, zobrist_keys};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_pseudo_legal, generate_pseudo_quiesce};
use crate::moves::square_control::{in_check, is_legal_castling};
use crate::moves::types::{Move, MoveBuffer, NullUndo, Undo};
use crate::square::Square;

/// Castling rook source/destination by king destination index.
#[inline(always)]
fn rook_castle_squares(king_to: u8) -> Option<(Square, Square)> {
    match king_to {
        6 => Some((Square::from_index(7), Square::from_index(5))), // White O-O
        2 => Some((Square::from_index(0), Square::from_index(3))), // White O-O-O
        62 => Some((Square::from_index(63), Square::from_index(61))), // Black O-O
        58 => Some((Square::from_index(56), Square::from_index(59))), // Black O-O-O
        _ => None,
    }
}

/// The castling right forfeited when a rook on `rook_sq` moves or dies.
#[inline(always)]
fn rights_cleared_for_rook(color: Color, rook_sq: u8) -> u8 {
    match (color, rook_sq) {
        (Color::White, 0) => CASTLE_WQ,
        (Color::White, 7) => CASTLE_WK,
        (Color::Black, 56) => CASTLE_BQ,
        (Color::Black, 63) => CASTLE_BK,
        _ => 0,
    }
}

#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.pieces(piece, color) & !(1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.pieces(piece, color) | (1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Apply a move, returning the record needed to reverse it exactly.
/// The incremental hash is kept in sync throughout; `undo_move` restores
/// every field including the hash byte-for-byte.
pub fn make_move(board: &mut Board, mv: Move) -> Undo {
    let color = board.side_to_move;
    let piece = mv.piece;
    let from_idx = mv.from.index() as usize;
    let to_idx = mv.to.index() as usize;

    let prev_en_passant = board.en_passant;

    // If an en-passant file contributes to the hash, XOR it out before
    // any state changes.
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }
    board.en_passant = None;

    let prev_halfmove_clock = board.halfmove_clock;
    let prev_fullmove_number = board.fullmove_number;

    // Remove the captured piece. For en passant the victim is the pawn
    // that just double-stepped, which is beside the mover, not on `to`.
    let mut capture = None;
    if mv.is_en_passant() {
        let cap_sq = match color {
            Color::White => to_idx - 8,
            Color::Black => to_idx + 8,
        };
        capture = Some((
            color.opposite(),
            Piece::Pawn,
            Square::from_index(cap_sq as u8),
        ));
        remove_piece(board, color.opposite(), Piece::Pawn, cap_sq);
    } else {
        let occupant = board.piece_on_sq[to_idx];
        if occupant != EMPTY_SQ {
            let cap_color = Color::from_u8(occupant >> 3);
            let cap_piece = Piece::from_u8(occupant & 0b111);
            capture = Some((cap_color, cap_piece, mv.to));
            remove_piece(board, cap_color, cap_piece, to_idx);
        }
    }

    let undo = Undo {
        from: mv.from,
        to: mv.to,
        piece,
        color,
        capture,
        castling_rook: rook_castle_squares(to_idx as u8).filter(|_| mv.is_castling()),
        promotion: mv.promotion,
        prev_castling_rights: board.castling_rights,
        prev_en_passant,
        prev_halfmove_clock,
        prev_fullmove_number,
    };

    // A double push exposes the moved pawn to en passant. The board stores
    // the pawn's own square.
    if mv.is_double_pawn_push() {
        board.en_passant = Some(mv.to);
        debug_assert!(
            (color == Color::White && mv.to.rank() == 3)
                || (color == Color::Black && mv.to.rank() == 4),
            "double push landed on rank {}",
            mv.to.rank() + 1
        );
    }

    // Collect every castling right this move forfeits, then apply them in
    // one delta so the hash update happens once.
    let old_rights = board.castling_rights;
    let mut cleared: u8 = 0;
    if piece == Piece::King {
        cleared |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if piece == Piece::Rook {
        cleared |= rights_cleared_for_rook(color, mv.from.index());
    }
    if let Some((cap_color, Piece::Rook, cap_sq)) = capture {
        cleared |= rights_cleared_for_rook(cap_color, cap_sq.index());
    }
    let new_rights = old_rights & !cleared;
    if new_rights != old_rights {
        board.castling_rights = new_rights;
        xor_castling_rights_delta(&mut board.zobrist, zobrist_keys(), old_rights, new_rights);
    }

    // Move the piece; promotions swap in the promoted piece on `to`.
    remove_piece(board, color, piece, from_idx);
    if let Some(prom) = mv.promotion {
        debug_assert!(piece == Piece::Pawn, "only pawns promote");
        place_piece(board, color, prom, to_idx);
    } else {
        place_piece(board, color, piece, to_idx);
    }

    // Castling moves the rook in the same ply.
    if let Some((rook_from, rook_to)) = undo.castling_rook {
        remove_piece(board, color, Piece::Rook, rook_from.index() as usize);
        place_piece(board, color, Piece::Rook, rook_to.index() as usize);
    }

    if capture.is_some() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock = prev_halfmove_clock + 1;
    }
    if color == Color::Black {
        board.fullmove_number = prev_fullmove_number + 1;
    }

    board.side_to_move = color.opposite();
    board.zobrist ^= zobrist_keys().side_to_move;

    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    #[cfg(debug_assertions)]
    board.assert_hash();

    undo
}

/// Restore the exact pre-move state, hash included.
pub fn undo_move(board: &mut Board, undo: Undo) {
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    board.side_to_move = undo.color;
    board.zobrist ^= zobrist_keys().side_to_move;

    let cur_rights = board.castling_rights;
    if cur_rights != undo.prev_castling_rights {
        xor_castling_rights_delta(
            &mut board.zobrist,
            zobrist_keys(),
            cur_rights,
            undo.prev_castling_rights,
        );
        board.castling_rights = undo.prev_castling_rights;
    }

    board.halfmove_clock = undo.prev_halfmove_clock;
    board.fullmove_number = undo.prev_fullmove_number;

    let from_idx = undo.from.index() as usize;
    let to_idx = undo.to.index() as usize;

    if let Some(prom) = undo.promotion {
        remove_piece(board, undo.color, prom, to_idx);
        place_piece(board, undo.color, Piece::Pawn, from_idx);
    } else {
        remove_piece(board, undo.color, undo.piece, to_idx);
        place_piece(board, undo.color, undo.piece, from_idx);
    }

    // The captured square is recorded explicitly, so en passant needs no
    // special case here.
    if let Some((cap_color, cap_piece, cap_sq)) = undo.capture {
        place_piece(board, cap_color, cap_piece, cap_sq.index() as usize);
    }

    if let Some((rook_from, rook_to)) = undo.castling_rook {
        remove_piece(board, undo.color, Piece::Rook, rook_to.index() as usize);
        place_piece(board, undo.color, Piece::Rook, rook_from.index() as usize);
    }

    board.en_passant = undo.prev_en_passant;
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    #[cfg(debug_assertions)]
    board.assert_hash();
}

/// Pass the move: flip the side to move without touching the pieces.
pub fn make_null_move(board: &mut Board) -> NullUndo {
    let undo = NullUndo {
        prev_en_passant: board.en_passant,
        prev_halfmove_clock: board.halfmove_clock,
    };

    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }
    board.en_passant = None;

    board.side_to_move = board.side_to_move.opposite();
    board.zobrist ^= zobrist_keys().side_to_move;

    undo
}

pub fn undo_null_move(board: &mut Board, undo: NullUndo) {
    board.side_to_move = board.side_to_move.opposite();
    board.zobrist ^= zobrist_keys().side_to_move;

    board.en_passant = undo.prev_en_passant;
    if let Some(f) = ep_file_to_hash(board) {
        board.zobrist ^= zobrist_keys().ep_file[f as usize];
    }

    board.halfmove_clock = undo.prev_halfmove_clock;
}

/// Fully legal moves: pseudolegal generation followed by a make/undo
/// legality filter. Castling additionally rejects through-check paths.
pub fn generate_legal(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    generate_pseudo_legal(board, tables, scratch);
    moves.clear();

    for i in 0..scratch.len() {
        let mv = scratch[i];
        if mv.is_castling() && !is_legal_castling(board, mv, tables) {
            continue;
        }
        let mover = board.side_to_move;
        let undo = make_move(board, mv);
        let illegal = in_check(board, mover, tables);
        undo_move(board, undo);
        if !illegal {
            moves.push(mv);
        }
    }
}

/// Legal captures and promotions only, for quiescence.
pub fn generate_quiesce(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    generate_pseudo_quiesce(board, tables, scratch);
    moves.clear();

    for i in 0..scratch.len() {
        let mv = scratch[i];
        let mover = board.side_to_move;
        let undo = make_move(board, mv);
        let illegal = in_check(board, mover, tables);
        undo_move(board, undo);
        if !illegal {
            moves.push(mv);
        }
    }
}

/// Find the legal move matching long-algebraic text like `e2e4`/`e7e8q`.
pub fn find_uci_move(
    board: &mut Board,
    tables: &MagicTables,
    text: &str,
) -> Option<Move> {
    if text.len() < 4 {
        return None;
    }
    let from = Square::parse(text.get(0..2)?)?;
    let to = Square::parse(text.get(2..4)?)?;
    let promo = match text.as_bytes().get(4) {
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(_) => return None,
        None => None,
    };

    let mut moves: Vec<Move> = Vec::with_capacity(64);
    let mut scratch: Vec<Move> = Vec::with_capacity(256);
    generate_legal(board, tables, &mut moves, &mut scratch);

    moves
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && mv.promotion == promo)
}
