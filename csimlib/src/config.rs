use std::mem::size_of;
use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use crate::cache::Block;

/// Upper bound on the number of block slots, 2^26 blocks of metadata is about 1GiB
pub const MAX_BLOCKS: u64 = 1 << 26;

/// An unvalidated cache configuration, as read from JSON or assembled from command line arguments
///
/// Convert it with `CacheConfig::try_from` before handing it to a simulator
#[derive(Debug, Clone, Deserialize)]
pub struct RawCacheConfig {
    pub num_sets: u32,
    pub blocks_per_set: u32,
    pub block_size: u32,
    pub write_allocate: WriteAllocate,
    pub write_policy: WritePolicy,
    #[serde(default = "EvictionPolicy::default")]
    pub eviction_policy: EvictionPolicy,
}

/// Whether a store miss brings the block into the cache - write-allocate or no-write-allocate
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum WriteAllocate {
    #[serde(alias = "write-allocate")]
    #[value(name = "write-allocate")]
    WriteAllocate,
    #[serde(alias = "no-write-allocate")]
    #[value(name = "no-write-allocate")]
    NoWriteAllocate,
}

/// When stores reach memory - write-through or write-back
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum WritePolicy {
    #[serde(alias = "write-through")]
    #[value(name = "write-through")]
    WriteThrough,
    #[serde(alias = "write-back")]
    #[value(name = "write-back")]
    WriteBack,
}

/// The eviction policy used when a set is full - lru or fifo. Defaults to lru.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum EvictionPolicy {
    #[serde(alias = "lru")]
    #[value(name = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "fifo")]
    #[value(name = "fifo")]
    FirstInFirstOut,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::LeastRecentlyUsed
    }
}

/// The three cache organisations, derived from the geometry
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheShape {
    /// Many sets of one block each
    Direct,
    /// Many sets of several blocks each
    SetAssociative,
    /// A single set holding every block
    FullyAssociative,
}

impl CacheShape {
    /// Classifies a geometry, returning None for the single set, single block cache
    pub fn from_geometry(num_sets: u32, blocks_per_set: u32) -> Option<Self> {
        match (num_sets > 1, blocks_per_set > 1) {
            (true, false) => Some(CacheShape::Direct),
            (true, true) => Some(CacheShape::SetAssociative),
            (false, true) => Some(CacheShape::FullyAssociative),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: u32 },
    #[error("block size must be at least 4 bytes, got {0}")]
    BlockSizeTooSmall(u32),
    #[error("a cache with {num_sets} set(s) of {blocks_per_set} block(s) is neither direct mapped, set associative nor fully associative")]
    UnsupportedGeometry { num_sets: u32, blocks_per_set: u32 },
    #[error("{offset_bits} offset bits and {index_bits} index bits do not fit in a 32-bit address")]
    AddressTooNarrow { offset_bits: u32, index_bits: u32 },
    #[error("{num_sets} set(s) of {blocks_per_set} block(s) exceeds the limit of {limit} blocks", limit = MAX_BLOCKS)]
    TooLarge { num_sets: u32, blocks_per_set: u32 },
    #[error("write-back cannot be combined with no-write-allocate")]
    WriteBackWithoutAllocate,
}

/// A validated, immutable cache configuration
///
/// The only way to obtain one is through `CacheConfig::new` or `TryFrom<RawCacheConfig>`, so the
/// simulator never re-checks any of these invariants
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    num_sets: u32,
    blocks_per_set: u32,
    block_size: u32,
    write_allocate: WriteAllocate,
    write_policy: WritePolicy,
    eviction_policy: EvictionPolicy,
    shape: CacheShape,
}

impl CacheConfig {
    /// Validates the parameters and derives the cache shape
    ///
    /// # Arguments
    ///
    /// * `num_sets`: Number of sets, a positive power of two
    /// * `blocks_per_set`: Associativity, a positive power of two
    /// * `block_size`: Bytes per block, a power of two of at least 4
    /// * `write_allocate`: Behaviour on a store miss
    /// * `write_policy`: Behaviour on a store hit
    /// * `eviction_policy`: Victim selection when a set is full
    ///
    /// returns: Result<CacheConfig, ConfigError>
    pub fn new(
        num_sets: u32,
        blocks_per_set: u32,
        block_size: u32,
        write_allocate: WriteAllocate,
        write_policy: WritePolicy,
        eviction_policy: EvictionPolicy,
    ) -> Result<Self, ConfigError> {
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { name: "number of sets", value: num_sets });
        }
        if !blocks_per_set.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { name: "blocks per set", value: blocks_per_set });
        }
        if block_size < 4 {
            return Err(ConfigError::BlockSizeTooSmall(block_size));
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { name: "block size", value: block_size });
        }
        let shape = CacheShape::from_geometry(num_sets, blocks_per_set)
            .ok_or(ConfigError::UnsupportedGeometry { num_sets, blocks_per_set })?;
        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        if offset_bits + index_bits > u32::BITS {
            return Err(ConfigError::AddressTooNarrow { offset_bits, index_bits });
        }
        // Keeps the block storage within what a single allocation can hold
        let blocks = num_sets as u64 * blocks_per_set as u64;
        let bytes = blocks.checked_mul(size_of::<Block>() as u64);
        if blocks > MAX_BLOCKS || bytes.map_or(true, |bytes| bytes > isize::MAX as u64) {
            return Err(ConfigError::TooLarge { num_sets, blocks_per_set });
        }
        if write_policy == WritePolicy::WriteBack && write_allocate == WriteAllocate::NoWriteAllocate {
            return Err(ConfigError::WriteBackWithoutAllocate);
        }
        Ok(Self {
            num_sets,
            blocks_per_set,
            block_size,
            write_allocate,
            write_policy,
            eviction_policy,
            shape,
        })
    }

    pub fn num_sets(&self) -> u32 {
        self.num_sets
    }

    pub fn blocks_per_set(&self) -> u32 {
        self.blocks_per_set
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn write_allocate(&self) -> WriteAllocate {
        self.write_allocate
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction_policy
    }

    pub fn shape(&self) -> CacheShape {
        self.shape
    }

    /// Total number of block slots in the cache
    pub fn capacity(&self) -> usize {
        self.num_sets as usize * self.blocks_per_set as usize
    }
}

impl TryFrom<RawCacheConfig> for CacheConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCacheConfig) -> Result<Self, Self::Error> {
        CacheConfig::new(
            raw.num_sets,
            raw.blocks_per_set,
            raw.block_size,
            raw.write_allocate,
            raw.write_policy,
            raw.eviction_policy,
        )
    }
}
