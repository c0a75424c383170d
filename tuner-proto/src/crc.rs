//! CRC-16 checksum for command packets.
//!
//! Uses CRC-16/IBM-3740 (a.k.a. CCITT-FALSE) with a 256-entry lookup table.

use crc::{Crc, CRC_16_IBM_3740};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Calculate the CRC-16 of a byte slice.
#[inline]
#[must_use]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Incremental CRC-16 digest, for building a packet field by field.
pub struct Crc16Digest {
    digest: crc::Digest<'static, u16>,
}

impl Crc16Digest {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC16.digest(),
        }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    #[inline]
    #[must_use]
    pub fn finalize(self) -> u16 {
        self.digest.finalize()
    }
}

impl Default for Crc16Digest {
    fn default() -> Self {
        Self::new()
    }
}
