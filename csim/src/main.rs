use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::info;
use csimlib::config::{CacheConfig, EvictionPolicy, RawCacheConfig, WriteAllocate, WritePolicy};
use csimlib::io::open_trace;
use csimlib::simulator::Simulator;
use csimlib::trace::TraceReader;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Single-level cache simulator. Replays a trace of loads and stores"))]
struct Args {
    /// Number of sets, a power of two
    num_sets: u32,
    /// Blocks in each set, a power of two
    blocks_per_set: u32,
    /// Bytes in each block, a power of two of at least 4
    block_size: u32,
    #[arg(value_enum)]
    write_allocate: WriteAllocate,
    #[arg(value_enum)]
    write_policy: WritePolicy,
    #[arg(value_enum)]
    eviction_policy: EvictionPolicy,
    /// Trace file, standard input is read when omitted
    trace: Option<PathBuf>,

    /// Print the statistics as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let env = Env::default()
        .filter_or("CSIM_LOG", "warn")
        .write_style_or("CSIM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let start = Instant::now();
    let args = Args::parse();
    let raw = RawCacheConfig {
        num_sets: args.num_sets,
        blocks_per_set: args.blocks_per_set,
        block_size: args.block_size,
        write_allocate: args.write_allocate,
        write_policy: args.write_policy,
        eviction_policy: args.eviction_policy,
    };
    let config = CacheConfig::try_from(raw).map_err(|e| format!("Invalid cache configuration: {e}"))?;
    match &args.trace {
        Some(path) => replay(&args, &config, open_trace(path)?, start),
        None => replay(&args, &config, TraceReader::new(io::stdin().lock()), start),
    }
}

fn replay<R: BufRead>(args: &Args, config: &CacheConfig, trace: TraceReader<R>, start: Instant) -> Result<(), String> {
    // The whole trace is validated before the cache is created
    let accesses = trace
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Couldn't read the trace: {e}"))?;
    info!("Replaying {} access(es)", accesses.len());
    let mut simulator = Simulator::new(config);
    let result = simulator.run(accesses);
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        eprintln!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        let config = simulator.config();
        eprintln!("Parsed configuration: {config:?}");
        eprintln!("Valid cache lines: {} of {}", simulator.get_valid_line_count(), config.capacity());
    }
    Ok(())
}
