use std::io::Read;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Upper bound on the lines a cache may allocate, 2^26 lines is a little over 1.5GB of
/// bookkeeping
pub const MAX_CACHE_LINES: usize = 1 << 26;

/// The geometry of a cache: 2^s sets of E lines, each line holding a 2^b byte block
///
/// The short aliases match the usual `-s`, `-E` and `-b` flags, so either spelling works in a
/// JSON config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(alias = "s")]
    pub set_index_bits: u32,
    #[serde(alias = "E")]
    pub lines_per_set: usize,
    #[serde(alias = "b")]
    pub block_offset_bits: u32,
}

impl CacheConfig {
    pub fn new(set_index_bits: u32, lines_per_set: usize, block_offset_bits: u32) -> Self {
        Self {
            set_index_bits,
            lines_per_set,
            block_offset_bits,
        }
    }

    /// Parses a configuration from JSON. The result still needs validated before use
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Checks the geometry can be simulated
    ///
    /// The decoder shifts by s + b bits, so together they must fit in an address, and the cache
    /// allocates every line up front, so the line count is capped at [`MAX_CACHE_LINES`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines_per_set == 0 {
            return Err(ConfigError::NoLines);
        }
        let address_bits = self.set_index_bits.checked_add(self.block_offset_bits);
        if address_bits.map_or(true, |bits| bits > u64::BITS) {
            return Err(ConfigError::AddressTooNarrow {
                set_index_bits: self.set_index_bits,
                block_offset_bits: self.block_offset_bits,
            });
        }
        let total_lines = 1usize
            .checked_shl(self.set_index_bits)
            .and_then(|sets| sets.checked_mul(self.lines_per_set));
        if total_lines.map_or(true, |lines| lines > MAX_CACHE_LINES) {
            return Err(ConfigError::TooManyLines {
                set_index_bits: self.set_index_bits,
                lines_per_set: self.lines_per_set,
                max_lines: MAX_CACHE_LINES,
            });
        }
        Ok(())
    }

    /// Number of sets, 2^s. Only meaningful for a validated configuration
    pub fn num_sets(&self) -> usize {
        1usize.checked_shl(self.set_index_bits).unwrap_or(usize::MAX)
    }

    /// Block size in bytes, 2^b, saturating for very wide offsets
    pub fn line_size(&self) -> u64 {
        1u64.checked_shl(self.block_offset_bits).unwrap_or(u64::MAX)
    }
}
