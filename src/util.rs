// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common helpers

use alloc::vec::Vec;

use crate::frame::{Coil, Word};

/// The only single coil value that switches a coil `ON`.
pub const COIL_ON: Word = 0xFF00;

/// Turn a u16 coil value into a boolean value.
///
/// Exactly `0xFF00` is `ON`, every other value is `OFF`.
#[must_use]
pub const fn u16_coil_to_bool(coil: Word) -> Coil {
    coil == COIL_ON
}

/// Calculate the number of bytes required for a given number of coils.
#[must_use]
pub const fn packed_coils_len(bitcount: usize) -> usize {
    bitcount.div_ceil(8)
}

/// Pack coils into bytes, LSB first.
#[must_use]
pub fn pack_coils(coils: &[Coil]) -> Vec<u8> {
    let mut bytes = alloc::vec![0; packed_coils_len(coils.len())];
    for (i, _) in coils.iter().enumerate().filter(|(_, c)| **c) {
        bytes[i / 8] |= 1 << (i % 8);
    }
    bytes
}

/// Unpack `count` coils from packed bytes.
///
/// Surplus bits in the last byte are ignored. If `bytes` holds fewer than
/// `count` bits, only the available bits are returned.
#[must_use]
pub fn unpack_coils(bytes: &[u8], count: usize) -> Vec<Coil> {
    let count = count.min(bytes.len() * 8);
    (0..count)
        .map(|i| (bytes[i / 8] >> (i % 8)) & 0b1 > 0)
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;
    use rand::Rng;

    #[test]
    fn convert_coil_to_bool() {
        assert!(u16_coil_to_bool(0xFF00));
        assert!(!u16_coil_to_bool(0x0000));
        assert!(!u16_coil_to_bool(0x0001));
        assert!(!u16_coil_to_bool(0x00FF));
        assert!(!u16_coil_to_bool(0xFFFF));
    }

    #[test]
    fn packed_len() {
        assert_eq!(packed_coils_len(0), 0);
        assert_eq!(packed_coils_len(1), 1);
        assert_eq!(packed_coils_len(8), 1);
        assert_eq!(packed_coils_len(9), 2);
        assert_eq!(packed_coils_len(2000), 250);
    }

    #[test]
    fn pack_coils_into_bytes() {
        assert!(pack_coils(&[]).is_empty());
        assert_eq!(pack_coils(&[true]), [0b_1]);
        assert_eq!(pack_coils(&[false]), [0b_0]);
        assert_eq!(pack_coils(&[true, false]), [0b_01]);
        assert_eq!(pack_coils(&[false, true]), [0b_10]);
        assert_eq!(pack_coils(&[true; 8]), [0b_1111_1111]);
        assert_eq!(pack_coils(&[false; 8]), [0]);
        assert_eq!(pack_coils(&[true; 9]), [0xff, 1]);
        assert_eq!(
            pack_coils(&[false, false, false, false, false, true, false, false]),
            [0x20]
        );
    }

    #[test]
    fn unpack_coils_from_bytes() {
        assert!(unpack_coils(&[], 0).is_empty());
        assert!(unpack_coils(&[1, 2, 3], 0).is_empty());
        assert_eq!(unpack_coils(&[0b1], 1), [true]);
        assert_eq!(unpack_coils(&[0b01], 2), [true, false]);
        assert_eq!(unpack_coils(&[0b10], 2), [false, true]);
        assert_eq!(unpack_coils(&[0b101], 3), [true, false, true]);
        assert_eq!(unpack_coils(&[0xff, 0b11], 10), [true; 10]);
        // trailing bits are ignored
        assert_eq!(unpack_coils(&[0xff], 3), [true; 3]);
    }

    #[test]
    fn unpack_more_coils_than_available() {
        assert!(unpack_coils(&[], 4).is_empty());
        assert_eq!(unpack_coils(&[0xff], 12), [true; 8]);
    }

    #[test]
    fn pack_unpack_random_sequences() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let len = rng.gen_range(0..64);
            let bits: Vec<bool> = (0..len).map(|_| rng.r#gen()).collect();
            let packed = pack_coils(&bits);
            assert_eq!(packed.len(), packed_coils_len(len));
            assert_eq!(unpack_coils(&packed, len), bits);
        }
    }
}
