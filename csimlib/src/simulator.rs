use std::io::BufRead;
use std::time::{Duration, Instant};
use log::{debug, info, trace};
use crate::address::AddressDecoder;
use crate::cache::{CacheTrait, GenericCache};
use crate::config::{CacheConfig, WriteAllocate, WritePolicy};
use crate::stats::Statistics;
use crate::trace::{MemoryAccess, Operation, TraceError, TraceReader};

/// Cycles for any access that reaches the cache itself
pub const CACHE_CYCLES: u64 = 1;
/// Cycles for a single word written straight to memory
pub const MEMORY_CYCLES: u64 = 100;
/// Bytes moved per memory round trip
const WORD_BYTES: u64 = 4;

/// Cycles to move a whole block between the cache and memory
///
/// # Examples
///
/// ```
/// use csimlib::simulator::block_transfer_cycles;
/// assert_eq!(block_transfer_cycles(16), 400);
/// ```
pub fn block_transfer_cycles(block_size: u32) -> u64 {
    MEMORY_CYCLES * (block_size as u64 / WORD_BYTES)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
}

/// The simulator owns the cache for a whole run and accumulates its statistics.
///
/// Accesses are applied strictly in order, one at a time. It supports calling run or simulate
/// multiple times, continuing from the current cache state and updating the time taken to simulate
/// and the results accordingly
#[derive(Debug)]
pub struct Simulator {
    config: CacheConfig,
    cache: GenericCache,
    stats: Statistics,
    // Advanced once per access; feeds the block stamps
    clock: u64,
    block_transfer_cycles: u64,
    simulation_time: Duration,
}

impl Simulator {
    /// Creates a new simulator with an empty cache
    ///
    /// # Arguments
    ///
    /// * `config`: A validated cache configuration
    ///
    /// returns: Simulator
    pub fn new(config: &CacheConfig) -> Self {
        let decoder = AddressDecoder::new(config);
        debug!(
            "{:?} cache: {} set(s) x {} block(s) of {} bytes, {} offset bits, {} index bits",
            config.shape(),
            config.num_sets(),
            config.blocks_per_set(),
            config.block_size(),
            decoder.offset_bits(),
            decoder.index_bits()
        );
        Self {
            config: *config,
            cache: GenericCache::from_config(config),
            stats: Statistics::default(),
            clock: 0,
            block_transfer_cycles: block_transfer_cycles(config.block_size()),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Applies a single access to the cache, updating the statistics
    ///
    /// # Arguments
    ///
    /// * `access`: The load or store to simulate
    ///
    /// returns: AccessOutcome
    pub fn access(&mut self, access: MemoryAccess) -> AccessOutcome {
        self.clock += 1;
        let now = self.clock;
        let (tag, index) = self.cache.decode(access.address);
        match access.operation {
            Operation::Load => self.stats.total_loads += 1,
            Operation::Store => self.stats.total_stores += 1,
        }

        if let Some(slot) = self.cache.lookup(tag, index) {
            self.cache.touch(slot, now);
            self.stats.total_cycles += CACHE_CYCLES;
            match access.operation {
                Operation::Load => self.stats.load_hits += 1,
                Operation::Store => {
                    self.stats.store_hits += 1;
                    self.write(slot);
                }
            }
            return AccessOutcome::Hit;
        }

        match access.operation {
            Operation::Load => {
                self.stats.load_misses += 1;
                self.fill(tag, index, now);
            }
            Operation::Store => {
                self.stats.store_misses += 1;
                match self.config.write_allocate() {
                    WriteAllocate::WriteAllocate => {
                        let slot = self.fill(tag, index, now);
                        self.write(slot);
                    }
                    // Straight to memory, the cache is left untouched
                    WriteAllocate::NoWriteAllocate => self.stats.total_cycles += MEMORY_CYCLES,
                }
            }
        }
        AccessOutcome::Miss
    }

    /// Brings a block in from memory, writing back a dirty victim first
    fn fill(&mut self, tag: u32, index: u32, now: u64) -> usize {
        let fill = self.cache.install(tag, index, now);
        if fill.evicted_dirty && self.config.write_policy() == WritePolicy::WriteBack {
            trace!("Writing back dirty slot {}", fill.slot);
            self.stats.total_cycles += self.block_transfer_cycles;
        }
        self.stats.total_cycles += self.block_transfer_cycles + CACHE_CYCLES;
        fill.slot
    }

    /// Applies the write policy to a resident block being stored to
    fn write(&mut self, slot: usize) {
        match self.config.write_policy() {
            WritePolicy::WriteThrough => self.stats.total_cycles += MEMORY_CYCLES,
            WritePolicy::WriteBack => self.cache.block_mut(slot).dirty = true,
        }
    }

    /// Simulates a sequence of already parsed accesses
    ///
    /// # Arguments
    ///
    /// * `accesses`: The accesses, in trace order
    ///
    /// returns: &Statistics
    pub fn run<I: IntoIterator<Item = MemoryAccess>>(&mut self, accesses: I) -> &Statistics {
        let start = Instant::now();
        for access in accesses {
            self.access(access);
        }
        self.finish(start);
        &self.stats
    }

    /// Simulates a trace straight from a reader, parsing as it goes
    ///
    /// Accesses before a malformed line have already been applied when the error is returned. Use
    /// `trace::read_trace` and `run` to reject a bad trace before touching the cache
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace source, one access per line
    ///
    /// returns: Result<&Statistics, TraceError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<&Statistics, TraceError> {
        let start = Instant::now();
        for access in TraceReader::new(reader) {
            self.access(access?);
        }
        self.finish(start);
        Ok(&self.stats)
    }

    fn finish(&mut self, start: Instant) {
        self.simulation_time += Instant::now() - start;
        info!(
            "Simulated {} access(es): {} hit(s), {} miss(es), {} cycle(s)",
            self.stats.total_loads + self.stats.total_stores,
            self.stats.hits(),
            self.stats.misses(),
            self.stats.total_cycles
        );
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache(&self) -> &GenericCache {
        &self.cache
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of valid lines currently held
    pub fn get_valid_line_count(&self) -> usize {
        self.cache.get_valid_line_count()
    }
}
