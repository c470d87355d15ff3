mod scenarios;

use std::io;
use crate::config::CacheConfig;
use crate::simulator::Simulator;
use crate::stats::Statistics;

/// Replays a textual trace on a fresh cache, discarding verbose output
fn run(set_index_bits: u32, lines_per_set: usize, block_offset_bits: u32, trace: &str) -> Statistics {
    let config = CacheConfig::new(set_index_bits, lines_per_set, block_offset_bits);
    let mut simulator = Simulator::new(&config).unwrap();
    *simulator.simulate(trace.as_bytes(), &mut io::sink()).unwrap()
}
