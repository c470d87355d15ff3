/// An address split into the parts the cache uses. The block offset is discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tag: u64,
    pub set_index: u64,
}

/// Converts an address into a tag and a set index
///
/// The tag is everything above the set index and block offset bits, the set index is the `s`
/// bits directly above the offset. Shifting out all 64 bits gives zero rather than overflowing,
/// so a geometry using the whole address has a tag of 0
///
/// # Arguments
///
/// * `address`: The accessed address
/// * `set_index_bits`: s, the number of set index bits
/// * `block_offset_bits`: b, the number of block offset bits
///
/// returns: DecodedAddress
///
/// # Examples
///
/// ```
/// use cachelib::address::decode;
/// let decoded = decode(0b1101_0110, 2, 3);
/// assert_eq!(decoded.tag, 0b110);
/// assert_eq!(decoded.set_index, 0b10);
/// ```
pub fn decode(address: u64, set_index_bits: u32, block_offset_bits: u32) -> DecodedAddress {
    let tag = set_index_bits
        .checked_add(block_offset_bits)
        .and_then(|bits| address.checked_shr(bits))
        .unwrap_or(0);
    let set_mask = 1u64.checked_shl(set_index_bits).map_or(u64::MAX, |sets| sets - 1);
    let set_index = address.checked_shr(block_offset_bits).unwrap_or(0) & set_mask;
    DecodedAddress { tag, set_index }
}
