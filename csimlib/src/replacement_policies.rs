use crate::cache::Block;

/// A generic trait for implementing replacement policies. Used to parameterise a Cache.
///
/// Every block carries a logical timestamp. Filling a block always stamps it with the current
/// time, so a policy only decides whether a hit refreshes the stamp and which block to evict
pub trait ReplacementPolicy {
    /// Updates the policy when a resident block is hit
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `block`: The block which was hit
    /// * `now`: The logical time of the access
    ///
    /// returns: ()
    fn update_on_hit(&mut self, _block: &mut Block, _now: u64) {}

    /// Used by the cache to get a slot when a new block needs to be installed in a set
    ///
    /// The default picks the first invalid slot, and otherwise the slot with the oldest stamp,
    /// taking the lowest slot on ties
    ///
    /// # Arguments
    ///
    /// * `set`: The blocks of the set, in slot order. Never empty.
    ///
    /// returns: usize, the slot within the set
    fn choose_victim(&mut self, set: &[Block]) -> usize {
        first_free_or_oldest(set)
    }
}

/// Shared victim search. Only a strictly smaller stamp replaces the current candidate, so ties go
/// to the lowest slot
pub fn first_free_or_oldest(set: &[Block]) -> usize {
    let mut slot = 0;
    let mut oldest = u64::MAX;
    for (i, block) in set.iter().enumerate() {
        if !block.valid {
            return i;
        }
        if block.stamp < oldest {
            oldest = block.stamp;
            slot = i;
        }
    }
    slot
}

/// Least Recently Used replacement policy
///
/// Refreshes the stamp on every hit, so the oldest stamp belongs to the block which has gone
/// untouched the longest
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn update_on_hit(&mut self, block: &mut Block, now: u64) {
        block.stamp = now;
    }
}

/// First In First Out replacement policy
///
/// Hits leave the stamp alone, so it records when the block was loaded
#[derive(Debug, Default, Copy, Clone)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {}
