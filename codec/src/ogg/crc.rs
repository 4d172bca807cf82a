//! Ogg page checksum.
//!
//! CRC-32 with polynomial 0x04c11db7, MSB first, zero seed and no final
//! complement. The checksum field of the page is zeroed while computing.

/// CRC lookup table for Ogg.
static CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if r & 0x80000000 != 0 {
                r = (r << 1) ^ 0x04c11db7;
            } else {
                r <<= 1;
            }
            j += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
};

/// Byte range of the checksum field within a page header.
pub(crate) const CHECKSUM_RANGE: std::ops::Range<usize> = 22..26;

/// Folds `data` into a running checksum.
pub fn crc32_update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = (crc << 8) ^ CRC_TABLE[((crc >> 24) as u8 ^ byte) as usize];
    }
    crc
}

/// Calculates the CRC of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32_update(0, data)
}

/// Calculates the checksum of a serialized page, treating the stored
/// checksum bytes as zero. `page` must hold at least the fixed header.
pub fn page_checksum(page: &[u8]) -> u32 {
    let crc = crc32_update(0, &page[..CHECKSUM_RANGE.start]);
    let crc = crc32_update(crc, &[0u8; 4]);
    crc32_update(crc, &page[CHECKSUM_RANGE.end..])
}
