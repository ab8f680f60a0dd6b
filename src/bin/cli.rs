use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::time::Duration;
use stratus::board::{Board, Color, Piece};
use stratus::moves::execute::{find_uci_move, make_move};
use stratus::moves::magic::MagicTables;
use stratus::moves::magic::loader::load_magic_tables;
use stratus::moves::perft::{perft, perft_divide};
use stratus::search::context::SearchContext;
use stratus::search::eval::{Classical, Evaluator};
use stratus::search::repetition::RepetitionStack;
use stratus::search::search::search;
use stratus::square::Square;

const ENGINE_NAME: &str = "stratus 0.1";
const ENGINE_AUTHOR: &str = "stratus authors";
const TT_SIZE_MB: usize = 64;

/// Everything one protocol session owns: the game position, the line of
/// hashes leading to it, and the search state that persists between
/// `go` commands.
struct Session {
    board: Board,
    rep: RepetitionStack,
    ctx: SearchContext,
    tables: MagicTables,
    eval: Classical,
}

fn main() {
    if std::env::var_os("STRATUS_LOG").is_some() {
        stratus::logger::init_logging("logs/stratus.log", "debug");
    }

    let mut session = Session {
        board: Board::new(),
        rep: RepetitionStack::new(),
        ctx: SearchContext::new(TT_SIZE_MB),
        tables: load_magic_tables(),
        eval: Classical,
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name {}", ENGINE_NAME);
                println!("id author {}", ENGINE_AUTHOR);
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                session.board = Board::new();
                session.rep.clear();
                session.ctx.new_game();
            }
            "position" => handle_position(&mut session, &parts),
            "go" => handle_go(&mut session, &parts),
            "perft" => handle_perft(&mut session, &parts),
            "eval" => {
                println!("{}", session.eval.static_score(&session.board));
            }
            "print" => print_board(&session.board),
            "fen" => println!("{}", session.board.to_fen()),
            "bench" => run_bench(&mut session),
            "quit" => break,
            other => {
                println!("info string unknown command '{}'", other);
            }
        }
    }
}

/// `position startpos [moves ...]` / `position fen <fen> [moves ...]`.
/// A malformed position or an illegal move leaves the prior position
/// intact.
fn handle_position(session: &mut Session, parts: &[&str]) {
    let moves_idx = parts.iter().position(|&p| p == "moves");

    let parsed = if parts.get(1) == Some(&"startpos") {
        Ok(Board::new())
    } else if parts.get(1) == Some(&"fen") {
        let fen_end = moves_idx.unwrap_or(parts.len());
        Board::from_str(&parts[2..fen_end].join(" "))
    } else {
        Err("expected 'startpos' or 'fen'".to_string())
    };

    let mut board = match parsed {
        Ok(b) => b,
        Err(e) => {
            println!("info string rejected position: {}", e);
            return;
        }
    };

    let mut rep = RepetitionStack::new();
    if let Some(idx) = moves_idx {
        for text in &parts[idx + 1..] {
            match find_uci_move(&mut board, &session.tables, text) {
                Some(mv) => {
                    rep.push(board.zobrist);
                    make_move(&mut board, mv);
                }
                None => {
                    println!("info string rejected position: illegal move '{}'", text);
                    return;
                }
            }
        }
    }

    session.board = board;
    session.rep = rep;
}

fn handle_perft(session: &mut Session, parts: &[&str]) {
    match parts.get(1) {
        Some(&"divide") => {
            let depth = parts.get(2).and_then(|d| d.parse().ok()).unwrap_or(1);
            perft_divide(&mut session.board, &session.tables, depth);
        }
        Some(text) => match text.parse::<u32>() {
            Ok(depth) => {
                println!("{}", perft(&mut session.board, &session.tables, depth));
            }
            Err(_) => println!("info string perft needs a numeric depth"),
        },
        None => println!("info string perft needs a depth"),
    }
}

/// `go [depth D] [movetime T] [wtime T btime T winc I binc I movestogo N]
/// [infinite]`. Without any time argument a default depth is used.
fn handle_go(session: &mut Session, parts: &[&str]) {
    const DEFAULT_DEPTH: i32 = 6;

    let mut depth: Option<i32> = None;
    let mut movetime: Option<u64> = None;
    let mut wtime: Option<u64> = None;
    let mut btime: Option<u64> = None;
    let mut winc: u64 = 0;
    let mut binc: u64 = 0;
    let mut movestogo: Option<u64> = None;
    let mut infinite = false;

    let mut i = 1;
    while i < parts.len() {
        let arg = |offset: usize| parts.get(i + offset).and_then(|v| v.parse::<u64>().ok());
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "movetime" => {
                movetime = arg(1);
                i += 2;
            }
            "wtime" => {
                wtime = arg(1);
                i += 2;
            }
            "btime" => {
                btime = arg(1);
                i += 2;
            }
            "winc" => {
                winc = arg(1).unwrap_or(0);
                i += 2;
            }
            "binc" => {
                binc = arg(1).unwrap_or(0);
                i += 2;
            }
            "movestogo" => {
                movestogo = arg(1);
                i += 2;
            }
            "infinite" => {
                infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }

    let budget = if infinite {
        None
    } else if let Some(ms) = movetime {
        Some(Duration::from_millis(ms))
    } else {
        let (my_time, my_inc) = match session.board.side_to_move {
            Color::White => (wtime, winc),
            Color::Black => (btime, binc),
        };
        my_time.map(|t| Duration::from_millis(allocate_time(t, my_inc, movestogo)))
    };

    let target_depth = match depth {
        Some(d) => d,
        None if budget.is_some() || infinite => 0, // clock-driven
        None => DEFAULT_DEPTH,
    };

    let (_score, best) = search(
        &mut session.board,
        &session.tables,
        &session.eval,
        &mut session.ctx,
        &mut session.rep,
        target_depth,
        budget,
    );

    match best {
        Some(mv) => println!("bestmove {}", mv),
        None => println!("bestmove 0000"),
    }
}

/// Conservative clock slice: reserve a lag buffer, spread the rest over
/// the expected remaining moves, and cap any single move at a fifth of
/// what is left.
fn allocate_time(total_ms: u64, inc_ms: u64, movestogo: Option<u64>) -> u64 {
    let safety = (total_ms * 15 / 100).min(500);
    let usable = total_ms.saturating_sub(safety);

    let mut alloc = if let Some(mtg) = movestogo {
        usable / mtg.max(2) + inc_ms * 3 / 4
    } else if usable > 5000 {
        usable / 40 + inc_ms * 9 / 10
    } else if usable > 2000 {
        usable / 30 + inc_ms * 3 / 4
    } else if usable > 500 {
        usable / 20 + inc_ms / 2
    } else {
        inc_ms / 2 + 20
    };

    alloc = alloc.min(usable / 5).min(usable);
    if alloc < 10 && usable >= 10 {
        alloc = 10;
    }
    alloc
}

fn print_board(board: &Board) {
    for rank in (0..8).rev() {
        for file in 0..8 {
            let sq = Square::from_coords(rank, file);
            let glyph = match board.piece_at(sq) {
                Some((color, piece)) => {
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
                None => '-',
            };
            print!(" {} ", glyph);
        }
        println!("  {}", rank + 1);
    }
    println!();
    println!(" a  b  c  d  e  f  g  h");
}

/// Tiny built-in tactical suite; a quick health check rather than a
/// rating test.
fn run_bench(session: &mut Session) {
    const SUITE: &[(&str, &str)] = &[
        // scholar's mate completion
        (
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 0 4",
            "h5f7",
        ),
        // back-rank mate
        ("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1", "e1e8"),
        // promotion wins
        ("4k3/4P3/4K3/8/8/8/8/8 w - - 0 1", "e7e8q"),
        // winning a hanging queen
        ("rnb1kbnr/pppp1ppp/8/4p1q1/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 3", "f3g5"),
    ];

    let bar = ProgressBar::new(SUITE.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
        bar.set_style(style);
    }

    let mut solved = 0;
    for (fen, expected) in SUITE {
        let mut board = match Board::from_str(fen) {
            Ok(b) => b,
            Err(_) => continue,
        };
        let mut rep = RepetitionStack::new();
        session.ctx.new_game();

        let (_score, best) = search(
            &mut board,
            &session.tables,
            &session.eval,
            &mut session.ctx,
            &mut rep,
            0,
            Some(Duration::from_millis(1000)),
        );

        let got = best.map(|m| m.to_uci()).unwrap_or_default();
        if got == *expected {
            solved += 1;
        }
        bar.set_message(format!("{} -> {}", expected, got));
        bar.inc(1);
    }
    bar.finish();

    println!("bench: {}/{} solved", solved, SUITE.len());
    session.ctx.new_game();
}
