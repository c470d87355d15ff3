use std::io::{self, BufReader, Read, Write};
use proptest::prelude::*;
use crate::config::CacheConfig;
use crate::error::SimError;
use crate::simulator::Simulator;
use crate::stats::Statistics;
use crate::trace::{AccessKind, AccessRecord};
use super::run;

const YI_TRACE: &str = " L 10,1
 M 20,1
 L 22,1
 S 18,1
 L 110,1
 L 210,1
 M 12,1
";

fn stats(hits: u64, misses: u64, evictions: u64) -> Statistics {
    Statistics { hits, misses, evictions }
}

#[test]
fn different_sets_never_conflict() {
    // With one set bit and no offset the set is the low bit of the address
    assert_eq!(run(1, 1, 0, "L 0,1\nL 1,1\n"), stats(0, 2, 0));
    assert_eq!(run(1, 1, 0, "L 0,1\nL 1,1\nL 0,1\nL 1,1\n"), stats(2, 2, 0));
}

#[test]
fn even_addresses_share_a_set() {
    // 0 and 2 both have a clear low bit, so they fight over set 0
    assert_eq!(run(1, 1, 0, "L 0,1\nL 2,1\n"), stats(0, 2, 1));
}

#[test]
fn fully_associative_fills_then_hits() {
    assert_eq!(run(0, 2, 0, "L 0,1\nL 8,1\nL 0,1\n"), stats(1, 2, 0));
}

#[test]
fn modify_is_a_load_then_a_store() {
    assert_eq!(run(0, 1, 0, "M 0,1\n"), stats(1, 1, 0));
}

#[test]
fn repeated_access_hits() {
    for kind in ["L", "S"] {
        let trace = format!("{kind} 40,4\n{kind} 40,4\n");
        assert_eq!(run(0, 1, 0, &trace), stats(1, 1, 0));
    }
}

#[test]
fn alternating_conflicts_never_hit() {
    let trace: String = (0..10)
        .map(|i| if i % 2 == 0 { "L 0,8\n" } else { "L 1,8\n" })
        .collect();
    assert_eq!(run(0, 1, 0, &trace), stats(0, 10, 9));
}

#[test]
fn instruction_fetches_are_ignored() {
    let mut simulator = Simulator::new(&CacheConfig::new(0, 1, 0)).unwrap();
    let result = *simulator
        .simulate("I 0,4\nI 10,4\nI 0,4\n".as_bytes(), &mut io::sink())
        .unwrap();
    assert_eq!(result, stats(0, 0, 0));
    assert_eq!(simulator.clock(), 1);

    let with_fetches = run(1, 1, 0, "L 0,1\nI 2,4\nL 2,1\nI 0,4\nL 0,1\n");
    let without_fetches = run(1, 1, 0, "L 0,1\nL 2,1\nL 0,1\n");
    assert_eq!(with_fetches, without_fetches);
}

#[test]
fn clock_advances_once_per_data_record() {
    let mut simulator = Simulator::new(&CacheConfig::new(0, 2, 0)).unwrap();
    simulator
        .simulate("L 0,1\nM 8,1\nS 0,1\nI 0,1\n".as_bytes(), &mut io::sink())
        .unwrap();
    assert_eq!(simulator.clock(), 4);
    // Both halves of the modify stamp the line with the same time
    let line = simulator.cache().sets()[0]
        .lines()
        .iter()
        .find(|line| line.tag == 8)
        .unwrap();
    assert_eq!(line.recency, 2);
}

#[test]
fn matches_reference_trace() {
    assert_eq!(run(4, 1, 4, YI_TRACE), stats(4, 5, 3));
    assert_eq!(run(1, 1, 1, YI_TRACE), stats(2, 7, 5));
}

#[test]
fn verbose_prints_each_data_record() {
    let mut simulator = Simulator::new(&CacheConfig::new(4, 1, 4)).unwrap().verbose(true);
    let mut out = Vec::new();
    simulator
        .simulate("I 400d7d4,8\n L 7ff0005c8,8\n M 0421c7f0,4\n S 10,1\n".as_bytes(), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "L 7ff0005c8,8\nM 421c7f0,4\nS 10,1\n");
}

#[test]
fn quiet_simulation_writes_nothing() {
    let mut simulator = Simulator::new(&CacheConfig::new(4, 1, 4)).unwrap();
    let mut out = Vec::new();
    simulator.simulate(YI_TRACE.as_bytes(), &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn malformed_record_ends_the_trace() {
    assert_eq!(run(0, 1, 0, "L 0,1\nL 0,1\nnot a record\nL 100,1\n"), stats(1, 1, 0));
    assert_eq!(run(0, 1, 0, "L 0,1\nX 0,1\nL 0,1\n"), stats(0, 1, 0));
}

#[test]
fn negative_sizes_are_still_records() {
    assert_eq!(run(0, 1, 0, "L 0,1\nL 0,-1\nS 0,-8\nL 0,1\n"), stats(3, 1, 0));

    let mut simulator = Simulator::new(&CacheConfig::new(0, 1, 0)).unwrap().verbose(true);
    let mut out = Vec::new();
    simulator.simulate("M 1f,-4\n".as_bytes(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "M 1f,-4\n");
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(run(0, 1, 0, "L 0,1\n\n   \nL 0,1\n"), stats(1, 1, 0));
}

#[test]
fn simulate_accumulates_across_calls() {
    let mut simulator = Simulator::new(&CacheConfig::new(0, 1, 0)).unwrap();
    simulator.simulate("L 0,1\n".as_bytes(), &mut io::sink()).unwrap();
    let result = *simulator.simulate("L 0,1\nL 1,1\n".as_bytes(), &mut io::sink()).unwrap();
    assert_eq!(result, stats(1, 2, 1));
    assert_eq!(simulator.clock(), 4);
}

#[test]
fn replay_takes_parsed_records() {
    let records = [
        AccessRecord::new(AccessKind::Load, 0, 1),
        AccessRecord::new(AccessKind::Instruction, 0, 4),
        AccessRecord::new(AccessKind::Modify, 8, 1),
        AccessRecord::new(AccessKind::Store, 0, 1),
    ];
    let mut simulator = Simulator::new(&CacheConfig::new(0, 2, 0)).unwrap();
    let result = *simulator.replay(records, &mut io::sink()).unwrap();
    assert_eq!(result, stats(2, 2, 0));
    assert_eq!(simulator.get_uninitialised_line_count(), 0);
}

struct BrokenSource;

impl Read for BrokenSource {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }
}

struct BrokenOutput;

impl Write for BrokenOutput {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn verbose_write_errors_are_reported_as_output() {
    let mut simulator = Simulator::new(&CacheConfig::new(0, 1, 0)).unwrap().verbose(true);
    let err = simulator.simulate("L 0,1\n".as_bytes(), &mut BrokenOutput).unwrap_err();
    assert!(matches!(err, SimError::Output(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert!(err.to_string().starts_with("couldn't write verbose output"));
}

#[test]
fn read_errors_are_fatal() {
    let mut simulator = Simulator::new(&CacheConfig::new(0, 1, 0)).unwrap();
    let err = simulator
        .simulate(BufReader::new(BrokenSource), &mut io::sink())
        .unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
    assert!(err.to_string().starts_with("trace I/O failed"));
}

#[test]
fn summary_uses_the_conventional_format() {
    assert_eq!(stats(4, 5, 3).to_string(), "hits:4 misses:5 evictions:3");
    let json = serde_json::to_value(stats(1, 2, 0)).unwrap();
    assert_eq!(json, serde_json::json!({"hits": 1, "misses": 2, "evictions": 0}));
}

fn access_record() -> impl Strategy<Value = AccessRecord> {
    let kind = prop_oneof![
        Just(AccessKind::Instruction),
        Just(AccessKind::Load),
        Just(AccessKind::Store),
        Just(AccessKind::Modify),
    ];
    (kind, 0u64..(1 << 12), -16i32..64).prop_map(|(kind, address, size)| AccessRecord::new(kind, address, size))
}

proptest! {
    /// Hits and misses add up to one access per load or store and two per modify, and the
    /// clock moves once per data record
    #[test]
    fn accesses_balance_with_records(
        s in 0u32..4,
        lines_per_set in 1usize..5,
        b in 0u32..5,
        records in prop::collection::vec(access_record(), 0..400),
    ) {
        let expected_accesses: u64 = records
            .iter()
            .map(|record| match record.kind {
                AccessKind::Instruction => 0,
                AccessKind::Load | AccessKind::Store => 1,
                AccessKind::Modify => 2,
            })
            .sum();
        let data_records = records.iter().filter(|record| record.kind != AccessKind::Instruction).count() as u64;
        let modifies = records.iter().filter(|record| record.kind == AccessKind::Modify).count() as u64;
        let mut simulator = Simulator::new(&CacheConfig::new(s, lines_per_set, b)).unwrap();
        let result = *simulator.replay(records, &mut io::sink()).unwrap();
        prop_assert_eq!(result.accesses(), expected_accesses);
        prop_assert!(result.evictions <= result.misses);
        // The store half of a modify always hits
        prop_assert!(result.hits >= modifies);
        prop_assert_eq!(simulator.clock(), data_records + 1);
    }
}
