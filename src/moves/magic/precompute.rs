//! Deterministic magic-number generation.
//!
//! Magics are searched with a seeded PRNG so every startup builds the same
//! tables and the self-test is reproducible. Failure to find a magic for
//! any square is fatal; the caller aborts startup.

use crate::moves::magic::attacks::{
    bishop_attacks_per_square, get_bishop_attack_bitboards, get_rook_attack_bitboards,
    rook_attacks_per_square,
};
use crate::moves::magic::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::collections::HashMap;

const MAX_ATTEMPTS: u32 = 1_000_000;

/// Sparse random candidates (AND of three draws) collide far less often in
/// the magic multiplication.
#[inline(always)]
fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Relevant-occupancy mask for a rook: the rays without their edge squares.
fn rook_mask(square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let mut mask = 0u64;

    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

fn bishop_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;

    for (dr, df) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let (mut r, mut f) = (rank + dr, file + df);
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Enumerate every subset of `mask` (carry-rippler).
fn blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// A candidate is valid when no two blocker sets with different attack
/// boards land on the same index (constructive collisions are fine).
fn is_magic_candidate_valid(blockers: &[u64], attacks: &[u64], magic: u64, shift: u32) -> bool {
    let mut seen: HashMap<u64, u64> = HashMap::with_capacity(blockers.len());

    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        let index = blocker.wrapping_mul(magic) >> shift;
        match seen.get(&index) {
            None => {
                seen.insert(index, attack);
            }
            Some(&existing) if existing != attack => return false,
            _ => {}
        }
    }
    true
}

fn find_magic_for_square<R: RngCore>(
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<u64, String> {
    for _ in 0..MAX_ATTEMPTS {
        let magic = random_sparse_u64(rng);
        if is_magic_candidate_valid(blockers, attacks, magic, shift) {
            return Ok(magic);
        }
    }
    Err(format!(
        "no valid magic number after {} attempts",
        MAX_ATTEMPTS
    ))
}

fn build_entry<R: RngCore>(
    square: usize,
    mask: u64,
    attacks_for: impl Fn(usize, u64) -> u64,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let blockers = blocker_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| attacks_for(square, b)).collect();

    let bits = mask.count_ones();
    let shift = 64 - bits;
    let magic = find_magic_for_square(&blockers, &attacks, shift, rng)
        .map_err(|e| format!("square {}: {}", square, e))?;

    let mut table = vec![0u64; 1usize << bits].into_boxed_slice();
    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

/// Build both sliding-piece tables from a fixed seed and self-test them.
pub fn generate_magic_tables(seed: u64) -> Result<MagicTables, String> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for square in 0..64 {
        rook_entries.push(build_entry(
            square,
            rook_mask(square),
            rook_attacks_per_square,
            &mut rng,
        )?);
    }
    for square in 0..64 {
        bishop_entries.push(build_entry(
            square,
            bishop_mask(square),
            bishop_attacks_per_square,
            &mut rng,
        )?);
    }

    let tables = MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    };

    self_test(&tables)?;
    Ok(tables)
}

/// Startup correctness check: for every square, compare the magic lookup
/// against the scan generator across a sample of blocker subsets.
pub fn self_test(tables: &MagicTables) -> Result<(), String> {
    for square in 0..64 {
        let rook_subsets = blocker_subsets(rook_mask(square));
        let rook_attacks = get_rook_attack_bitboards(square, &rook_subsets);
        // every 7th subset plus the empty and full sets
        for (i, (&blockers, &expected)) in
            rook_subsets.iter().zip(rook_attacks.iter()).enumerate()
        {
            if i % 7 != 0 && i != rook_subsets.len() - 1 {
                continue;
            }
            let got = tables.rook.get_attacks(square, blockers);
            if got != expected {
                return Err(format!(
                    "rook self-test failed at square {} blockers {:#x}",
                    square, blockers
                ));
            }
        }

        let bishop_subsets = blocker_subsets(bishop_mask(square));
        let bishop_attacks = get_bishop_attack_bitboards(square, &bishop_subsets);
        for (i, (&blockers, &expected)) in
            bishop_subsets.iter().zip(bishop_attacks.iter()).enumerate()
        {
            if i % 7 != 0 && i != bishop_subsets.len() - 1 {
                continue;
            }
            let got = tables.bishop.get_attacks(square, blockers);
            if got != expected {
                return Err(format!(
                    "bishop self-test failed at square {} blockers {:#x}",
                    square, blockers
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_mask_drops_edges() {
        // a1 rook: ray squares minus a8/h1 edges
        let mask = rook_mask(0);
        assert_eq!(mask.count_ones(), 12);
        assert_eq!(mask & (1 << 7), 0);
        assert_eq!(mask & (1 << 56), 0);
    }

    #[test]
    fn bishop_mask_central_square() {
        // d4 bishop sees 9 interior diagonal squares
        assert_eq!(bishop_mask(27).count_ones(), 9);
    }

    #[test]
    fn subsets_enumerate_the_powerset() {
        let mask = 0b1011u64;
        let subsets = blocker_subsets(mask);
        assert_eq!(subsets.len(), 8);
        assert!(subsets.contains(&0));
        assert!(subsets.contains(&mask));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_magic_tables(7).unwrap();
        let b = generate_magic_tables(7).unwrap();
        assert_eq!(a.rook.entries[0].magic, b.rook.entries[0].magic);
        assert_eq!(a.bishop.entries[63].magic, b.bishop.entries[63].magic);
    }
}
