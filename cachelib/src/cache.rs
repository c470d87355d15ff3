use tracing::trace;
use crate::address::{decode, DecodedAddress};
use crate::config::CacheConfig;
use crate::error::ConfigError;

/// A generic trait for cache models driven by the simulator
///
/// Only the LRU cache below implements it, but it keeps the simulator independent of how lines
/// are stored and chosen
pub trait CacheModel {
    /// Converts an address into a tag and a set index for this cache's geometry
    fn address_to_set_and_tag(&self, address: u64) -> DecodedAddress;

    /// Looks up the line holding an address, installing it on a miss
    ///
    /// On both hits and misses the implementation must update the recency of the touched line
    ///
    /// # Arguments
    ///
    /// * `address`: The accessed address. Size is irrelevant, the whole access maps to one line
    /// * `timestamp`: The logical time of the access
    ///
    /// returns: AccessOutcome
    fn access(&mut self, address: u64, timestamp: u64) -> AccessOutcome;

    /// Gets the number of lines which have never been filled. Useful for analysing cache
    /// performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// The classification of a single cache access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    /// The block was installed into a line which was still empty
    Miss,
    /// The block replaced the least recently used valid line of its set
    MissWithEviction,
}

/// A line's bookkeeping, there is no data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
    /// Logical time of the last access, meaningless while the line is invalid
    pub recency: u64,
}

/// The lines of one set, in line index order. The length never changes after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    fn new(lines_per_set: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); lines_per_set],
        }
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Looks up a tag in the set, installing it on a miss
    ///
    /// A single pass finds the hit, the first empty line and the least recently used valid line
    /// together. An empty line always wins over an eviction, but the scan can't stop at one as
    /// the tag may still be held further along the set. The victim is the first valid line with
    /// the strictly lowest recency
    fn access(&mut self, tag: u64, timestamp: u64) -> AccessOutcome {
        let mut first_empty: Option<usize> = None;
        let mut victim = 0;
        let mut victim_recency = timestamp;
        for (index, line) in self.lines.iter_mut().enumerate() {
            if !line.valid {
                first_empty.get_or_insert(index);
            } else if line.tag == tag {
                line.recency = timestamp;
                return AccessOutcome::Hit;
            } else if line.recency < victim_recency {
                victim_recency = line.recency;
                victim = index;
            }
        }
        let (slot, outcome) = match first_empty {
            Some(index) => (index, AccessOutcome::Miss),
            None => (victim, AccessOutcome::MissWithEviction),
        };
        self.lines[slot] = CacheLine {
            valid: true,
            tag,
            recency: timestamp,
        };
        outcome
    }
}

/// A set-associative cache with least recently used replacement
///
/// Storage is 2^s sets of E lines, allocated once when the cache is created. Recency is supplied
/// by the caller with every access rather than kept internally, so several accesses can share a
/// timestamp
#[derive(Debug, Clone)]
pub struct Cache {
    config: CacheConfig,
    sets: Vec<CacheSet>,
}

impl Cache {
    /// Creates an empty cache, every line invalid
    ///
    /// # Arguments
    ///
    /// * `config`: The geometry, rejected if it can't be simulated or would need more than
    /// [`MAX_CACHE_LINES`](crate::config::MAX_CACHE_LINES) lines
    ///
    /// returns: Result<Cache, ConfigError>
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: *config,
            sets: vec![CacheSet::new(config.lines_per_set); config.num_sets()],
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }
}

impl CacheModel for Cache {
    fn address_to_set_and_tag(&self, address: u64) -> DecodedAddress {
        decode(address, self.config.set_index_bits, self.config.block_offset_bits)
    }

    fn access(&mut self, address: u64, timestamp: u64) -> AccessOutcome {
        let DecodedAddress { tag, set_index } = self.address_to_set_and_tag(address);
        // The set mask keeps the index below 2^s, which validation guarantees fits in usize
        let outcome = self.sets[set_index as usize].access(tag, timestamp);
        trace!(address = format_args!("{address:#x}"), set_index, tag, timestamp, ?outcome, "cache access");
        outcome
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|set| set.lines.iter())
            .filter(|line| !line.valid)
            .count()
    }
}
