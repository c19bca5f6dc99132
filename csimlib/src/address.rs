use crate::config::CacheConfig;

/// Splits 32-bit addresses into a tag and a set index
///
/// The bit widths and the index mask are computed once from the configuration. Block size and
/// set count are powers of two, so their trailing zero counts are exact logarithms
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    index_bits: u32,
    index_mask: u32,
}

impl AddressDecoder {
    pub fn new(config: &CacheConfig) -> Self {
        let offset_bits = config.block_size().trailing_zeros();
        let index_bits = config.num_sets().trailing_zeros();
        Self {
            offset_bits,
            index_bits,
            // num_sets is at most 2^31, so this never overflows
            index_mask: config.num_sets() - 1,
        }
    }

    /// Converts an address into a (tag, index) pair
    ///
    /// A fully associative cache has a single set, so the mask is zero and the index is always 0
    ///
    /// # Arguments
    ///
    /// * `address`: The byte address being accessed
    ///
    /// returns: (u32, u32)
    pub fn decode(&self, address: u32) -> (u32, u32) {
        let index = address.checked_shr(self.offset_bits).unwrap_or(0) & self.index_mask;
        // Shifting by the full width leaves no tag bits at all
        let tag = address.checked_shr(self.offset_bits + self.index_bits).unwrap_or(0);
        (tag, index)
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }
}

/// Convenience wrapper for one-off decoding against a configuration
pub fn decode(address: u32, config: &CacheConfig) -> (u32, u32) {
    AddressDecoder::new(config).decode(address)
}
