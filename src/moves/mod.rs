pub mod execute;
pub mod magic;
pub mod masks;
pub mod movegen;
pub mod perft;
pub mod square_control;
pub mod types;
