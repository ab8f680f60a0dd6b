pub mod attacks;
pub mod loader;
pub mod precompute;
pub mod structs;

pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
