use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::info;
use crate::cache::{Cache, CacheModel};
use crate::config::CacheConfig;
use crate::error::{ConfigError, SimError};
use crate::stats::Statistics;
use crate::trace::{AccessKind, AccessRecord, TraceReader};

/// The simulator replays access records against a cache, and collects results.
///
/// It supports calling simulate multiple times. The cache contents, the logical clock, the
/// results and the time taken all carry over between calls
pub struct Simulator {
    cache: Cache,
    result: Statistics,
    /// Logical LRU clock, advanced once per data access record
    clock: u64,
    verbose: bool,
    simulation_time: Duration,
}

impl Simulator {

    /// Creates a new simulator with an empty cache
    ///
    /// # Arguments
    ///
    /// * `config`: The cache geometry, usually from the command line or parsed from JSON
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            cache: Cache::new(config)?,
            result: Statistics::default(),
            clock: 1,
            verbose: false,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Enables printing each replayed record to the output passed to simulate
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replays a single record
    ///
    /// Instruction fetches are skipped without touching the clock. A modify is a load then a
    /// store, both at the same timestamp, so the store always hits and leaves the recency as it
    /// was. The verbose line for a modify is written between its two accesses
    fn replay_record<W: Write + ?Sized>(&mut self, record: &AccessRecord, out: &mut W) -> Result<(), SimError> {
        if record.kind == AccessKind::Instruction {
            return Ok(());
        }
        let outcome = self.cache.access(record.address, self.clock);
        self.result.record(outcome);
        if self.verbose {
            writeln!(out, "{record}").map_err(SimError::Output)?;
        }
        if record.kind == AccessKind::Modify {
            let outcome = self.cache.access(record.address, self.clock);
            self.result.record(outcome);
        }
        self.clock += 1;
        Ok(())
    }

    /// Replays already parsed records in order
    ///
    /// # Arguments
    ///
    /// * `records`: The records, in trace order
    /// * `out`: Where verbose lines are written. Untouched unless verbose is enabled
    ///
    /// returns: Result<&Statistics, SimError>, the totals across every call so far
    pub fn replay<I, W>(&mut self, records: I, out: &mut W) -> Result<&Statistics, SimError>
    where
        I: IntoIterator<Item = AccessRecord>,
        W: Write + ?Sized,
    {
        let start = Instant::now();
        for record in records {
            self.replay_record(&record, out)?;
        }
        self.finish(start);
        Ok(&self.result)
    }

    /// Simulates the cache on a trace in the text format
    ///
    /// Reading stops at the end of the input or at the first malformed line, whichever comes
    /// first. A malformed line isn't an error, everything before it is still counted
    ///
    /// # Arguments
    ///
    /// * `trace`: The trace source
    /// * `out`: Where verbose lines are written. Untouched unless verbose is enabled
    ///
    /// returns: Result<&Statistics, SimError>, the totals across every call so far
    pub fn simulate<R, W>(&mut self, trace: R, out: &mut W) -> Result<&Statistics, SimError>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let start = Instant::now();
        for record in TraceReader::new(trace) {
            self.replay_record(&record?, out)?;
        }
        self.finish(start);
        Ok(&self.result)
    }

    fn finish(&mut self, start: Instant) {
        self.simulation_time += start.elapsed();
        info!(
            hits = self.result.hits,
            misses = self.result.misses,
            evictions = self.result.evictions,
            clock = self.clock,
            "trace replay finished"
        );
    }

    pub fn statistics(&self) -> &Statistics {
        &self.result
    }

    /// The timestamp the next data access record will be given
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines the trace never filled
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.cache.get_uninitialised_line_count()
    }
}
