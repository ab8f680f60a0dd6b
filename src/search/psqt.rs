//! Tapered piece-square tables.
//!
//! Each piece has an (opening, endgame) table pair blended by the phase
//! computed from remaining non-pawn material. Tables are written with
//! rank 8 as the first visual row: White indexes with `sq ^ 56`, Black
//! with `sq` directly, so one table serves both colors mirrored.

/// Phase ranges over 0 (full material, pure opening) to 256 (bare kings,
/// pure endgame).
pub const PHASE_MAX: i32 = 256;

/// Blend one opening/endgame pair by phase.
#[inline(always)]
pub fn taper(mg: i32, eg: i32, phase: i32) -> i32 {
    (mg * (PHASE_MAX - phase) + eg * phase) / PHASE_MAX
}

#[rustfmt::skip]
pub const PAWN_TABLE: ([i32; 64], [i32; 64]) = (
    // opening
    [
      0,   0,   0,   0,   0,   0,   0,   0,
     60,  65,  60,  65,  60,  55,  50,  55,
     15,  25,  30,  35,  35,  30,  25,  15,
      5,  10,  15,  25,  25,  10,   5,   0,
      0,   5,  10,  22,  22,   5,   0,  -5,
      2,   0,   5,  10,  10,  -5,   5,   2,
      5,  10,   5, -10, -10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // endgame
    [
      0,   0,   0,   0,   0,   0,   0,   0,
    120, 115, 105, 100, 100, 105, 115, 120,
     70,  65,  60,  55,  55,  60,  65,  70,
     35,  30,  25,  22,  22,  25,  30,  35,
     18,  15,  12,  10,  10,  12,  15,  18,
      8,   6,   5,   5,   5,   5,   6,   8,
      5,   5,   5,   5,   5,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
    ],
);

#[rustfmt::skip]
pub const KNIGHT_TABLE: ([i32; 64], [i32; 64]) = (
    [
    -50, -30, -20, -20, -20, -20, -30, -50,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -20,   5,  10,  15,  15,  10,   5, -20,
    -20,   0,  15,  20,  20,  15,   0, -20,
    -20,   5,  15,  20,  20,  15,   5, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -50, -30, -20, -20, -20, -20, -30, -50,
    ],
    [
    -40, -25, -15, -15, -15, -15, -25, -40,
    -25, -10,   0,   0,   0,   0, -10, -25,
    -15,   0,   8,  10,  10,   8,   0, -15,
    -15,   2,  10,  15,  15,  10,   2, -15,
    -15,   2,  10,  15,  15,  10,   2, -15,
    -15,   0,   8,  10,  10,   8,   0, -15,
    -25, -10,   0,   0,   0,   0, -10, -25,
    -40, -25, -15, -15, -15, -15, -25, -40,
    ],
);

#[rustfmt::skip]
pub const BISHOP_TABLE: ([i32; 64], [i32; 64]) = (
    [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   8,   0,   0,   0,   0,   8, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    [
    -15,  -8,  -8,  -8,  -8,  -8,  -8, -15,
     -8,   0,   0,   0,   0,   0,   0,  -8,
     -8,   0,   5,   5,   5,   5,   0,  -8,
     -8,   0,   5,   8,   8,   5,   0,  -8,
     -8,   0,   5,   8,   8,   5,   0,  -8,
     -8,   0,   5,   5,   5,   5,   0,  -8,
     -8,   0,   0,   0,   0,   0,   0,  -8,
    -15,  -8,  -8,  -8,  -8,  -8,  -8, -15,
    ],
);

#[rustfmt::skip]
pub const ROOK_TABLE: ([i32; 64], [i32; 64]) = (
    [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  12,  12,  12,  12,  12,  12,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   2,   0,   0,
    ],
    [
      3,   3,   3,   3,   3,   3,   3,   3,
      8,   8,   8,   8,   8,   8,   8,   8,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
    ],
);

#[rustfmt::skip]
pub const QUEEN_TABLE: ([i32; 64], [i32; 64]) = (
    [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    ],
    [
    -10,  -5,  -5,  -3,  -3,  -5,  -5, -10,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -3,   0,   5,   8,   8,   5,   0,  -3,
     -3,   0,   5,   8,   8,   5,   0,  -3,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
    -10,  -5,  -5,  -3,  -3,  -5,  -5, -10,
    ],
);

#[rustfmt::skip]
pub const KING_TABLE: ([i32; 64], [i32; 64]) = (
    [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -25, -25, -20, -20, -10,
     10,  10, -10, -15, -15, -10,  10,  10,
     15,  25,  10, -10,   0, -10,  25,  15,
    ],
    [
    -50, -30, -20, -15, -15, -20, -30, -50,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -20,   0,  15,  20,  20,  15,   0, -20,
    -15,   5,  20,  30,  30,  20,   5, -15,
    -15,   5,  20,  30,  30,  20,   5, -15,
    -20,   0,  15,  20,  20,  15,   0, -20,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -50, -30, -20, -15, -15, -20, -30, -50,
    ],
);
