use std::ops::Range;
use log::trace;
use crate::address::AddressDecoder;
use crate::config::{CacheConfig, CacheShape, EvictionPolicy};
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, ReplacementPolicy};

/// One cache line slot
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
    /// Logical time of the last fill, or of the last hit under LRU
    pub stamp: u64,
}

/// The result of installing a block
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fill {
    /// Slot index into the whole cache
    pub slot: usize,
    /// Set when the previous occupant was valid and dirty, and so must be written back
    pub evicted_dirty: bool,
}

/// A generic trait for caches
///
/// Slots are plain indices into the cache's block storage, so the simulator can hold on to one
/// across calls without borrowing the cache
pub trait CacheTrait {
    /// Converts an address into a tag and a set index
    fn decode(&self, address: u32) -> (u32, u32);

    /// Searches the addressed set for a valid block with a matching tag
    ///
    /// # Arguments
    ///
    /// * `tag`: The decoded tag
    /// * `index`: The decoded set index, ignored by fully associative caches
    ///
    /// returns: Option<usize>, the slot on a hit
    fn lookup(&self, tag: u32, index: u32) -> Option<usize>;

    /// Informs the replacement policy that a slot was hit at time `now`
    fn touch(&mut self, slot: usize, now: u64);

    /// Installs a block for `tag` in the addressed set, evicting if needed
    ///
    /// The installed block is valid, clean, and stamped with `now` whatever the policy. Any
    /// write-back cost for a dirty victim is the caller's to charge, using the returned `Fill`
    fn install(&mut self, tag: u32, index: u32, now: u64) -> Fill;

    fn block(&self, slot: usize) -> &Block;

    fn block_mut(&mut self, slot: usize) -> &mut Block;

    /// The blocks of one set, in slot order
    fn set(&self, index: u32) -> &[Block];

    /// Gets the number of valid cache lines. Useful for analysing cache performance or debugging
    fn get_valid_line_count(&self) -> usize;
}

/// A cache parameterised by a replacement policy
///
/// All blocks live in one contiguous vector, set after set, and everything else refers to them by
/// index. The shape only decides which range of slots an address may occupy
#[derive(Debug)]
pub struct Cache<R: ReplacementPolicy> {
    decoder: AddressDecoder,
    shape: CacheShape,
    blocks_per_set: usize,
    blocks: Vec<Block>,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(config: &CacheConfig, policy: R) -> Self {
        Self {
            decoder: AddressDecoder::new(config),
            shape: config.shape(),
            blocks_per_set: config.blocks_per_set() as usize,
            blocks: vec![Block::default(); config.capacity()],
            replacement_policy: policy,
        }
    }

    fn set_bounds(&self, index: u32) -> Range<usize> {
        match self.shape {
            CacheShape::Direct => {
                let slot = index as usize;
                slot..slot + 1
            }
            CacheShape::SetAssociative => {
                let lower = index as usize * self.blocks_per_set;
                lower..lower + self.blocks_per_set
            }
            CacheShape::FullyAssociative => 0..self.blocks_per_set,
        }
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn decode(&self, address: u32) -> (u32, u32) {
        self.decoder.decode(address)
    }

    fn lookup(&self, tag: u32, index: u32) -> Option<usize> {
        let bounds = self.set_bounds(index);
        let lower = bounds.start;
        self.blocks[bounds]
            .iter()
            .position(|block| block.valid && block.tag == tag)
            .map(|way| lower + way)
    }

    fn touch(&mut self, slot: usize, now: u64) {
        self.replacement_policy.update_on_hit(&mut self.blocks[slot], now);
    }

    fn install(&mut self, tag: u32, index: u32, now: u64) -> Fill {
        let bounds = self.set_bounds(index);
        let slot = match self.shape {
            // One candidate, nothing to choose
            CacheShape::Direct => bounds.start,
            CacheShape::SetAssociative | CacheShape::FullyAssociative => {
                bounds.start + self.replacement_policy.choose_victim(&self.blocks[bounds.clone()])
            }
        };
        let victim = &mut self.blocks[slot];
        let evicted_dirty = victim.valid && victim.dirty;
        if victim.valid {
            trace!("Evicting tag {:#x} from slot {slot} (set {index}), dirty: {evicted_dirty}", victim.tag);
        }
        *victim = Block {
            valid: true,
            dirty: false,
            tag,
            stamp: now,
        };
        Fill { slot, evicted_dirty }
    }

    fn block(&self, slot: usize) -> &Block {
        &self.blocks[slot]
    }

    fn block_mut(&mut self, slot: usize) -> &mut Block {
        &mut self.blocks[slot]
    }

    fn set(&self, index: u32) -> &[Block] {
        &self.blocks[self.set_bounds(index)]
    }

    fn get_valid_line_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.valid).count()
    }
}

/// Enum for both eviction policies provided by the library
///
/// Branching explicitly on the concrete cache types lets the compiler inline the policy hooks on
/// every access, which a trait object would hide from it
#[derive(Debug)]
pub enum GenericCache {
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    FirstInFirstOut(Cache<FirstInFirstOut>),
}

impl GenericCache {
    /// Creates an empty cache for a configuration, with every block invalid
    pub fn from_config(config: &CacheConfig) -> Self {
        match config.eviction_policy() {
            EvictionPolicy::LeastRecentlyUsed => Cache::new(config, LeastRecentlyUsed).into(),
            EvictionPolicy::FirstInFirstOut => Cache::new(config, FirstInFirstOut).into(),
        }
    }
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl CacheTrait for GenericCache {
    fn decode(&self, address: u32) -> (u32, u32) {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.decode(address),
            GenericCache::FirstInFirstOut(c) => c.decode(address),
        }
    }

    fn lookup(&self, tag: u32, index: u32) -> Option<usize> {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.lookup(tag, index),
            GenericCache::FirstInFirstOut(c) => c.lookup(tag, index),
        }
    }

    fn touch(&mut self, slot: usize, now: u64) {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.touch(slot, now),
            GenericCache::FirstInFirstOut(c) => c.touch(slot, now),
        }
    }

    fn install(&mut self, tag: u32, index: u32, now: u64) -> Fill {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.install(tag, index, now),
            GenericCache::FirstInFirstOut(c) => c.install(tag, index, now),
        }
    }

    fn block(&self, slot: usize) -> &Block {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.block(slot),
            GenericCache::FirstInFirstOut(c) => c.block(slot),
        }
    }

    fn block_mut(&mut self, slot: usize) -> &mut Block {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.block_mut(slot),
            GenericCache::FirstInFirstOut(c) => c.block_mut(slot),
        }
    }

    fn set(&self, index: u32) -> &[Block] {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.set(index),
            GenericCache::FirstInFirstOut(c) => c.set(index),
        }
    }

    fn get_valid_line_count(&self) -> usize {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.get_valid_line_count(),
            GenericCache::FirstInFirstOut(c) => c.get_valid_line_count(),
        }
    }
}
