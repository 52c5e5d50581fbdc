/// Number of address bits needed to index `total` distinct addresses, i.e. `ceil(log2(total))`.
/// A single address needs no bit at all.
pub fn bits_needed(total: u128) -> u32 {
    if total <= 1 {
        0
    } else {
        u128::BITS - (total - 1).leading_zeros()
    }
}

/// Mask with the `bits` low bits set
pub fn low_mask(bits: u32) -> u64 {
    debug_assert!(bits <= u64::BITS);

    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Smallest power-of-two address window covering every configured region. Bits above the
/// window are ignored by the decoder so the regions are mirrored over the rest of the bus.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AddressMask {
    bits: u32,
    mask: u64,
}

impl AddressMask {
    /// Build the window for `total` configured addresses. `total` can't be above 2^64.
    pub fn for_total(total: u128) -> AddressMask {
        let bits = bits_needed(total);

        AddressMask {
            bits,
            mask: low_mask(bits),
        }
    }

    pub fn bits(self) -> u32 {
        self.bits
    }

    pub fn mask(self) -> u64 {
        self.mask
    }

    /// Strip the bits above the decode window
    pub fn apply(self, addr: u64) -> u64 {
        addr & self.mask
    }

    /// True if `addr` has bits set above the window and decodes as a mirror of `apply(addr)`
    pub fn aliases(self, addr: u64) -> bool {
        addr & !self.mask != 0
    }
}

#[test]
fn window_bits() {
    assert_eq!(bits_needed(1), 0);
    assert_eq!(bits_needed(2), 1);
    assert_eq!(bits_needed(3), 2);
    assert_eq!(bits_needed(64), 6);
    assert_eq!(bits_needed(65), 7);
    assert_eq!(bits_needed(1 << 64), 64);

    assert_eq!(low_mask(0), 0);
    assert_eq!(low_mask(6), 0x3f);
    assert_eq!(low_mask(64), u64::MAX);
}

#[test]
fn masking() {
    let m = AddressMask::for_total(64);

    assert_eq!(m.bits(), 6);
    assert_eq!(m.mask(), 0x3f);
    assert_eq!(m.apply(64), 0);
    assert_eq!(m.apply(200), 8);
    assert!(m.aliases(200));
    assert!(!m.aliases(63));

    // Single address: everything mirrors address 0
    let m = AddressMask::for_total(1);
    assert_eq!(m.apply(0xdead_beef), 0);

    let m = AddressMask::for_total(1 << 64);
    assert_eq!(m.apply(u64::MAX), u64::MAX);
    assert!(!m.aliases(u64::MAX));
}
