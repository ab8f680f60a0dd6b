use crate::board::Board;
use crate::moves::{
    execute::{generate_legal, make_move, undo_move},
    magic::MagicTables,
    types::Move,
};
use tracing::{debug, instrument};

const MAX_PERFT_DEPTH: usize = 16;

fn make_buffers() -> (Vec<Vec<Move>>, Vec<Vec<Move>>) {
    let moves = (0..MAX_PERFT_DEPTH)
        .map(|_| Vec::with_capacity(64))
        .collect();
    let scratch = (0..MAX_PERFT_DEPTH)
        .map(|_| Vec::with_capacity(256))
        .collect();
    (moves, scratch)
}

fn perft_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    move_buffers: &mut [Vec<Move>],
    scratch_buffers: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let (moves, scratch) = (&mut move_buffers[ply], &mut scratch_buffers[ply]);
        generate_legal(board, tables, moves, scratch);
    }

    if depth == 1 {
        return move_buffers[ply].len() as u64;
    }

    let count = move_buffers[ply].len();
    let mut nodes = 0;
    for i in 0..count {
        let mv = move_buffers[ply][i];

        #[cfg(debug_assertions)]
        let hash_before = board.zobrist;

        let undo = make_move(board, mv);
        nodes += perft_recursive(board, tables, depth - 1, ply + 1, move_buffers, scratch_buffers);
        undo_move(board, undo);

        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(board.zobrist, hash_before, "hash changed across make/undo");
            debug_assert_eq!(
                board.compute_zobrist_full(),
                board.zobrist,
                "incremental hash diverged from full recompute"
            );
        }
    }
    nodes
}

/// Leaf count at `depth` from the current position.
#[instrument(skip(board, tables))]
pub fn perft(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    assert!(
        (depth as usize) <= MAX_PERFT_DEPTH,
        "perft depth {} exceeds {}",
        depth,
        MAX_PERFT_DEPTH
    );
    let (mut moves, mut scratch) = make_buffers();
    let nodes = perft_recursive(board, tables, depth, 0, &mut moves, &mut scratch);
    debug!(depth, nodes, "perft complete");
    nodes
}

/// Per-root-move leaf counts, printed in long algebraic form.
#[instrument(skip(board, tables))]
pub fn perft_divide(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    assert!(depth >= 1, "divide needs depth >= 1");
    let (mut moves, mut scratch) = make_buffers();

    {
        let (m, s) = (&mut moves[0], &mut scratch[0]);
        generate_legal(board, tables, m, s);
    }

    let count = moves[0].len();
    let mut total = 0;
    for i in 0..count {
        let mv = moves[0][i];
        let undo = make_move(board, mv);
        let nodes = perft_recursive(board, tables, depth - 1, 1, &mut moves, &mut scratch);
        undo_move(board, undo);

        println!("{}: {}", mv, nodes);
        total += nodes;
    }
    println!("Total: {}", total);
    total
}
