use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::Square;

fn piece_from_char(c: char) -> Option<(Color, Piece)> {
    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let piece = match c.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    Some((color, piece))
}

fn piece_to_char(color: Color, piece: Piece) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

impl Board {
    /// Load a position from a FEN string, replacing the current state.
    ///
    /// The board keeps the square of the double-stepped pawn itself, so
    /// the conventional FEN en-passant square (the square jumped over) is
    /// translated on the way in. A malformed FEN leaves `self` untouched
    /// only at the caller's discretion; callers that need transactional
    /// behavior should parse into a scratch board first.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields, got {}", fields.len()));
        }

        let mut board = Board::new_empty();

        // Field 1: piece placement, rank 8 down to rank 1.
        let mut rank: i32 = 7;
        let mut file: i32 = 0;
        for c in fields[0].chars() {
            match c {
                '/' => {
                    if file != 8 {
                        return Err(format!("rank {} has {} files", rank + 1, file));
                    }
                    rank -= 1;
                    file = 0;
                    if rank < 0 {
                        return Err("too many ranks in FEN".to_string());
                    }
                }
                '1'..='8' => {
                    file += c as i32 - '0' as i32;
                    if file > 8 {
                        return Err(format!("rank {} overflows", rank + 1));
                    }
                }
                _ => {
                    let (color, piece) =
                        piece_from_char(c).ok_or_else(|| format!("bad piece char '{}'", c))?;
                    if file > 7 {
                        return Err(format!("rank {} overflows", rank + 1));
                    }
                    let sq = (rank * 8 + file) as u8;
                    let bb = board.bb(color, piece) | (1u64 << sq);
                    board.set_bb(color, piece, bb);
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err("FEN placement does not cover 8 ranks".to_string());
        }

        // Field 2: side to move.
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("bad side to move '{}'", other)),
        };

        // Field 3: castling rights. Flags that do not match the actual
        // king and rook placement are silently dropped.
        board.castling_rights = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("bad castling flag '{}'", other)),
                };
            }

            let white_rooks = board.bb(Color::White, Piece::Rook);
            let black_rooks = board.bb(Color::Black, Piece::Rook);
            if board.bb(Color::White, Piece::King) != 1 << 4 {
                board.castling_rights &= !(CASTLE_WK | CASTLE_WQ);
            }
            if white_rooks & (1 << 7) == 0 {
                board.castling_rights &= !CASTLE_WK;
            }
            if white_rooks & 1 == 0 {
                board.castling_rights &= !CASTLE_WQ;
            }
            if board.bb(Color::Black, Piece::King) != 1 << 60 {
                board.castling_rights &= !(CASTLE_BK | CASTLE_BQ);
            }
            if black_rooks & (1 << 63) == 0 {
                board.castling_rights &= !CASTLE_BK;
            }
            if black_rooks & (1 << 56) == 0 {
                board.castling_rights &= !CASTLE_BQ;
            }
        }

        // Field 4: en passant. FEN names the square behind the pawn; we
        // store the pawn's own square.
        board.en_passant = match fields[3] {
            "-" => None,
            text => {
                let behind =
                    Square::parse(text).ok_or_else(|| format!("bad en-passant square '{}'", text))?;
                let pawn_sq = match board.side_to_move {
                    // Black to move: White pawn advanced, behind square on rank 3.
                    Color::Black if behind.rank() == 2 => behind.index() + 8,
                    // White to move: Black pawn advanced, behind square on rank 6.
                    Color::White if behind.rank() == 5 => behind.index() - 8,
                    _ => return Err(format!("en-passant square '{}' on wrong rank", text)),
                };
                Some(Square::from_index(pawn_sq))
            }
        };

        // Fields 5 and 6 are optional in practice.
        board.halfmove_clock = match fields.get(4) {
            Some(text) => text
                .parse()
                .map_err(|_| format!("bad halfmove clock '{}'", text))?,
            None => 0,
        };
        board.fullmove_number = match fields.get(5) {
            Some(text) => text
                .parse()
                .map_err(|_| format!("bad fullmove number '{}'", text))?,
            None => 1,
        };

        board.validate()?;
        board.refresh_zobrist();

        *self = board;
        Ok(())
    }

    /// Render the position as a 6-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::from_coords(rank, file);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(piece_to_char(color, piece));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                fen.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                fen.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                fen.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            None => fen.push('-'),
            Some(pawn_sq) => {
                // Convert the stored pawn square back to the square behind it.
                let behind = match self.side_to_move {
                    Color::Black => pawn_sq.index() - 8,
                    Color::White => pawn_sq.index() + 8,
                };
                fen.push_str(&Square::from_index(behind).to_string());
            }
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}
