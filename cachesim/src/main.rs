use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use cachelib::config::CacheConfig;
use cachelib::io::open_trace;
use cachelib::simulator::Simulator;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative LRU cache simulator for valgrind memory traces"))]
struct Args {
    /// Number of set index bits (2^s sets)
    #[arg(short = 's', required_unless_present = "config")]
    set_index_bits: Option<u32>,

    /// Number of lines per set (associativity)
    #[arg(short = 'E', required_unless_present = "config")]
    lines_per_set: Option<usize>,

    /// Number of block offset bits (2^b byte blocks)
    #[arg(short = 'b', required_unless_present = "config")]
    block_offset_bits: Option<u32>,

    /// Trace file to replay
    #[arg(short = 't')]
    trace: PathBuf,

    /// JSON file holding the geometry. Flags given alongside it take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print every replayed record
    #[arg(short, long)]
    verbose: bool,

    /// Print the statistics as JSON instead of the summary line
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn cache_config(&self) -> Result<CacheConfig, String> {
        let base = match &self.config {
            Some(path) => {
                let config_file = File::open(path)
                    .map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
                Some(CacheConfig::from_reader(BufReader::new(config_file))
                    .map_err(|e| format!("Couldn't parse the config file: {e}"))?)
            }
            None => None,
        };
        // clap guarantees each flag is present when there is no config file
        let pick = |flag: Option<u32>, from_file: Option<u32>| flag.or(from_file).unwrap_or_default();
        Ok(CacheConfig {
            set_index_bits: pick(self.set_index_bits, base.map(|c| c.set_index_bits)),
            lines_per_set: self.lines_per_set.or(base.map(|c| c.lines_per_set)).unwrap_or_default(),
            block_offset_bits: pick(self.block_offset_bits, base.map(|c| c.block_offset_bits)),
        })
    }
}

/// The banner printed ahead of the per-record lines in verbose mode
fn verbose_header(trace: &Path, config: &CacheConfig) -> String {
    format!(
        "Verbose mode enabled.\n\
         Trace filename: {}\n\
         Number of sets index bits: {}\n\
         Number of block offset bits: {}\n\
         Number of lines per set: {}\n",
        trace.display(),
        config.set_index_bits,
        config.block_offset_bits,
        config.lines_per_set,
    )
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let config = args.cache_config()?;
    debug!(?config, trace = %args.trace.display(), "starting simulation");
    let mut simulator = Simulator::new(&config)
        .map_err(|e| format!("Invalid cache configuration: {e}"))?
        .verbose(args.verbose);
    if args.verbose {
        print!("{}", verbose_header(&args.trace, &config));
    }
    let trace_reader = open_trace(&args.trace).map_err(|e| e.to_string())?;
    let result = *simulator
        .simulate(trace_reader, &mut io::stdout().lock())
        .map_err(|e| e.to_string())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        println!("Parsed input configuration: {config:?}");
        let total_lines = config.num_sets() * config.lines_per_set;
        println!("Uninitialised cache lines: {} of {total_lines}", simulator.get_uninitialised_line_count());
    }
    Ok(())
}
