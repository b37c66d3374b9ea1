// src/process/mod.rs

pub mod normalize;
pub mod write;

pub use normalize::{normalize_block, normalize_line, Record};
pub use write::{result_file_name, write_records};
