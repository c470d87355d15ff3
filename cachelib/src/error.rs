use std::io;
use thiserror::Error;

/// Reasons a cache geometry can be rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a set needs at least one line (E must be >= 1)")]
    NoLines,
    #[error("{set_index_bits} set index bits and {block_offset_bits} block offset bits don't fit in a 64 bit address")]
    AddressTooNarrow {
        set_index_bits: u32,
        block_offset_bits: u32,
    },
    #[error("2^{set_index_bits} sets of {lines_per_set} lines is more than the {max_lines} line limit")]
    TooManyLines {
        set_index_bits: u32,
        lines_per_set: usize,
        max_lines: usize,
    },
}

/// Errors which stop a simulation
#[derive(Debug, Error)]
pub enum SimError {
    #[error("trace I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("couldn't write verbose output: {0}")]
    Output(io::Error),
    #[error("invalid cache configuration: {0}")]
    Config(#[from] ConfigError),
}
