use crate::moves::magic::precompute::generate_magic_tables;
use crate::moves::magic::structs::MagicTables;
use once_cell::sync::OnceCell;
use tracing::debug;

/// Seed for the shipped magic set. Changing it invalidates any cached
/// `magic.bin`.
const MAGIC_SEED: u64 = 0x0045_1CEB_00C5_EED5;

#[cfg(feature = "load_magic")]
const MAGIC_CACHE_PATH: &str = "magic.bin";

static TABLES: OnceCell<MagicTables> = OnceCell::new();

/// Produce the sliding-attack tables. Generation runs once per process
/// and is seeded, so every run builds the identical set; with the
/// `load_magic` feature the serialized tables are read from (and written
/// to) disk instead. Failure is fatal: the engine cannot run without
/// valid tables.
pub fn load_magic_tables() -> MagicTables {
    TABLES.get_or_init(build_tables).clone()
}

fn build_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        if let Some(tables) = try_load_cache() {
            debug!("magic tables loaded from {}", MAGIC_CACHE_PATH);
            return tables;
        }
    }

    let tables = generate_magic_tables(MAGIC_SEED)
        .unwrap_or_else(|e| panic!("magic table generation failed: {}", e));
    debug!("magic tables generated from seed {:#x}", MAGIC_SEED);

    #[cfg(feature = "load_magic")]
    save_cache(&tables);

    tables
}

#[cfg(feature = "load_magic")]
fn try_load_cache() -> Option<MagicTables> {
    use crate::moves::magic::precompute::self_test;

    let bytes = std::fs::read(MAGIC_CACHE_PATH).ok()?;
    let tables: MagicTables = bincode::deserialize(&bytes).ok()?;
    // a stale or truncated cache must not poison move generation
    self_test(&tables).ok()?;
    Some(tables)
}

#[cfg(feature = "load_magic")]
fn save_cache(tables: &MagicTables) {
    if let Ok(bytes) = bincode::serialize(tables) {
        if let Err(e) = std::fs::write(MAGIC_CACHE_PATH, bytes) {
            debug!("could not write {}: {}", MAGIC_CACHE_PATH, e);
        }
    }
}
