//! Per-tile light mask

use bytemuck::{Pod, Zeroable};
use std::fmt;

use super::registry::{Slot, MAX_LIGHTS};

/// Fixed 32-bit set of light slots, stored exactly as it is uploaded.
///
/// Slot `s` lives in byte `s / 8`, bit `7 - s % 8`. One mask is one RGBA8
/// texel of the tile bitmask texture, so the shader reads slot 0 from the
/// most significant bit of the red channel.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Bitset32([u8; 4]);

impl Bitset32 {
    pub const EMPTY: Self = Self([0; 4]);

    #[inline]
    fn locate(slot: Slot) -> (usize, u8) {
        let index = slot.index();
        (index / 8, 1 << (7 - index % 8))
    }

    #[inline]
    pub fn set(&mut self, slot: Slot) {
        let (byte, bit) = Self::locate(slot);
        self.0[byte] |= bit;
    }

    #[inline]
    pub fn test(&self, slot: Slot) -> bool {
        let (byte, bit) = Self::locate(slot);
        self.0[byte] & bit != 0
    }

    #[inline]
    pub fn clear(&mut self, slot: Slot) {
        let (byte, bit) = Self::locate(slot);
        self.0[byte] &= !bit;
    }

    pub fn clear_all(&mut self) {
        self.0 = [0; 4];
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0; 4]
    }

    pub fn count(&self) -> u32 {
        u32::from_be_bytes(self.0).count_ones()
    }

    /// Set slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..MAX_LIGHTS as u8)
            .filter_map(Slot::new)
            .filter(move |slot| self.test(*slot))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Bitset32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitset32({:032b})", u32::from_be_bytes(self.0))
    }
}
