//! CRC-8 checksum used to protect every frame on the wire.
//!
//! The variant is the plain "CRC-8/SMBUS" form: polynomial `0x07`, initial
//! value `0x00`, MSB-first, no reflection and no final XOR.

/// Generator polynomial (x^8 + x^2 + x + 1) with the implicit top bit dropped.
pub const POLYNOMIAL: u8 = 0x07;

/// Compute the CRC-8 of `bytes`.
///
/// # Examples
///
/// ```
/// use serialframe::crc;
///
/// let covered = [0x07, b'A', b'B', b'C', b'D', b'E', b'F', b'G', 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
/// assert_eq!(crc::compute(&covered), 0x39);
/// ```
#[must_use]
pub const fn compute(bytes: &[u8]) -> u8 {
    let mut crc = 0u8;
    let mut i = 0;
    while i < bytes.len() {
        crc ^= bytes[i];
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        i += 1;
    }
    crc
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    /// Bit-serial reference working on a widened accumulator, one input bit
    /// at a time, so it shares no structure with [`compute`].
    fn reference_crc8(bytes: &[u8]) -> u8 {
        let mut reg: u16 = 0;
        for &byte in bytes {
            for shift in (0..8).rev() {
                let input = u16::from((byte >> shift) & 1);
                let top = (reg >> 7) & 1;
                reg = (reg << 1) & 0xFF;
                if top ^ input == 1 {
                    reg ^= u16::from(POLYNOMIAL);
                }
            }
        }
        u8::try_from(reg).expect("register is masked to eight bits")
    }

    const TEST_VECTOR: [u8; 17] = [
        0x07, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF,
    ];

    #[test]
    fn test_vector_matches_reference() {
        assert_eq!(compute(&TEST_VECTOR), reference_crc8(&TEST_VECTOR));
        assert_eq!(compute(&TEST_VECTOR), 0x39);
    }

    #[rstest]
    #[case(&[], 0x00)]
    #[case(&[0x00], 0x00)]
    #[case(&[0x01], 0x07)]
    #[case(b"123456789", 0xF4)]
    fn known_values(#[case] input: &[u8], #[case] expected: u8) {
        assert_eq!(compute(input), expected);
    }

    #[test]
    fn usable_in_const_context() {
        const CRC: u8 = compute(&[0x01]);
        assert_eq!(CRC, 0x07);
    }

    proptest! {
        #[test]
        fn agrees_with_bitwise_reference(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(compute(&bytes), reference_crc8(&bytes));
        }

        #[test]
        fn deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(compute(&bytes), compute(&bytes));
        }
    }
}
