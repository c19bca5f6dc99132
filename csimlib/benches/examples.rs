use std::fs::{self, File};
use std::io::BufReader;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use csimlib::config::{CacheConfig, RawCacheConfig};
use csimlib::simulator::Simulator;
use csimlib::trace::read_trace;
use csimlib::util::get_configs;

const SYNTHETIC_CONFIGS: [&str; 3] = [
    r#"{"num_sets": 1024, "blocks_per_set": 1, "block_size": 16, "write_allocate": "write-allocate", "write_policy": "write-back"}"#,
    r#"{"num_sets": 256, "blocks_per_set": 4, "block_size": 16, "write_allocate": "write-allocate", "write_policy": "write-back", "eviction_policy": "lru"}"#,
    r#"{"num_sets": 1, "blocks_per_set": 256, "block_size": 64, "write_allocate": "no-write-allocate", "write_policy": "write-through", "eviction_policy": "fifo"}"#,
];

/// A mostly local access pattern with occasional far jumps, so every cache shape sees some reuse
fn synthetic_trace(len: u32) -> String {
    let mut state: u32 = 0x2545_f491;
    let mut base: u32 = 0x1000_0000;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % 64 == 0 {
                base = state & 0xffff_f000;
            }
            let op = if state % 3 == 0 { 's' } else { 'l' };
            format!("{op} {:#010x} {}\n", base.wrapping_add(state % 4096), i % 9)
        })
        .collect()
}

/// Benchmark experimenting
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Examples");

    get_configs()
        .unwrap()
        .iter()
        .for_each(|case| {
            let config_file = File::open(&case.config).unwrap();
            // Ignoring expected output
            let raw: RawCacheConfig = serde_json::from_reader(BufReader::new(config_file)).unwrap();
            let config = CacheConfig::try_from(raw).unwrap();
            // For the purposes of this we aren't interested in IO effects
            let buf = fs::read(&case.trace).unwrap();
            group.bench_with_input(BenchmarkId::new("Example: ", case.output.clone()), &(config, buf), |bench, (conf, buf)| {
                bench.iter(|| {
                    Simulator::new(conf).simulate(&buf[..]).unwrap();
                });
            });
        });
    group.finish();

    let mut group = c.benchmark_group("Synthetic");
    let trace = synthetic_trace(100_000);
    let accesses = read_trace(trace.as_bytes()).unwrap();
    for (i, json) in SYNTHETIC_CONFIGS.iter().enumerate() {
        let raw: RawCacheConfig = serde_json::from_str(json).unwrap();
        let config = CacheConfig::try_from(raw).unwrap();
        group.bench_with_input(BenchmarkId::new("Parse and replay", i), &config, |bench, conf| {
            bench.iter(|| {
                Simulator::new(conf).simulate(trace.as_bytes()).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("Replay only", i), &config, |bench, conf| {
            bench.iter(|| {
                Simulator::new(conf).run(accesses.iter().copied());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
