//! # CacheLib
//!
//! Cachelib is a library for simulating a set-associative cache against a trace of memory
//! accesses
//!
//! It provides an LRU cache model, a decoder splitting addresses into tag and set index, and a
//! simulator which replays traces in the `<kind> <hex address>,<size>` format, counting hits,
//! misses and evictions
//!
//! Only tags, validity and recency are modelled, there is no memory contents, dirty state or
//! hierarchy

/// Contains the pure address decoder used by the cache
pub mod address;

/// Contains the cache model, its lines and sets, and the outcome of an access
pub mod cache;

/// Contains the cache geometry, which can be parsed from JSON or built directly
pub mod config;

/// Contains the error types surfaced by the library
pub mod error;

/// Contains helpers for opening trace files
pub mod io;

/// Contains the simulator used to replay a trace against a cache
pub mod simulator;

/// Contains the hit, miss and eviction counters
pub mod stats;

/// Contains the trace record types and the line parser
pub mod trace;

#[cfg(test)]
mod test;
