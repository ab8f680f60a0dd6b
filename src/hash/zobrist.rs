use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;

/// Fixed seed: key generation must be reproducible so identical inputs
/// search identical trees across runs.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K} = {0..5}.
    pub piece: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// [0]=K, [1]=Q, [2]=k, [3]=q.
    pub castling: [u64; 4],
    /// Files a..h.
    pub ep_file: [u64; 8],
}

/// XOR in the keys for every castling-right bit that differs.
#[inline]
pub fn xor_castling_rights_delta(hash: &mut u64, keys: &ZobristKeys, old: u8, new: u8) {
    let d = old ^ new;
    if d & CASTLE_WK != 0 {
        *hash ^= keys.castling[0];
    }
    if d & CASTLE_WQ != 0 {
        *hash ^= keys.castling[1];
    }
    if d & CASTLE_BK != 0 {
        *hash ^= keys.castling[2];
    }
    if d & CASTLE_BQ != 0 {
        *hash ^= keys.castling[3];
    }
}

/// XOR the side-to-move key (the hash of the same position with the other
/// side to move).
#[inline]
pub fn change_turn(hash: u64) -> u64 {
    hash ^ zobrist_keys().side_to_move
}

/// Returns Some(file 0..7) if en passant should contribute to the hash
/// this ply, else None.
///
/// The board stores the double-stepped pawn's square. The file key is
/// included only when the side to move actually has a pawn beside it that
/// could capture (pseudo-legal; pins and king safety ignored). Positions
/// that differ only by a dead en-passant right hash identically.
pub fn ep_file_to_hash(board: &Board) -> Option<u8> {
    let pawn_sq = board.en_passant?;
    let r = pawn_sq.rank();

    // White to move captures a black pawn on rank 5; Black to move
    // captures a white pawn on rank 4.
    let expected_rank = match board.side_to_move {
        Color::White => 4,
        Color::Black => 3,
    };
    if r != expected_rank {
        return None;
    }

    let bb = pawn_sq.bitboard();
    let beside = ((bb & !FILE_H) << 1) | ((bb & !FILE_A) >> 1);
    let capturers = beside & board.pieces(Piece::Pawn, board.side_to_move);

    if capturers != 0 {
        Some(pawn_sq.file())
    } else {
        None
    }
}

/// Global keys, generated once on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // zero keys would degenerate into no-ops
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 4],
        ep_file: [0u64; 8],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    for i in 0..4 {
        keys.castling[i] = non_zero(&mut rng);
    }
    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn keys_are_stable_across_calls() {
        let a = zobrist_keys();
        let b = zobrist_keys();
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.piece[0][0][0], b.piece[0][0][0]);
    }

    #[test]
    fn ep_key_requires_a_capturer() {
        // White just pushed e2e4 but no black pawn stands beside it.
        let quiet =
            Board::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(ep_file_to_hash(&quiet), None);

        // Black pawn on d4 can take e4 en passant.
        let live =
            Board::from_str("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(ep_file_to_hash(&live), Some(4));
    }

    #[test]
    fn change_turn_is_an_involution() {
        let h = 0xDEAD_BEEF_u64;
        assert_eq!(change_turn(change_turn(h)), h);
    }
}
