use std::ops::RangeInclusive;

/// Contains some helper methods to manipulate bits,
/// the index (`bit_idx`) is supposed to be from lsb to msb (right to left)
pub trait Bits: Copy {
    fn get_bit(&self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    /// Extracts `bits_range` (inclusive) and moves it down to bit 0.
    fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self;

    /// Returns a sign-extended copy of the value.
    /// `number_of_bits` is the width of the two's complement value
    /// stored in the low bits.
    fn sign_extended(&self, number_of_bits: u8) -> Self;
}

macro_rules! impl_bits {
    ($($unsigned:ty => $signed:ty),* $(,)?) => {
        $(
            impl Bits for $unsigned {
                fn get_bit(&self, bit_idx: u8) -> bool {
                    debug_assert!(u32::from(bit_idx) < <$unsigned>::BITS);
                    (*self >> bit_idx) & 1 == 1
                }

                fn set_bit(&mut self, bit_idx: u8, value: bool) {
                    debug_assert!(u32::from(bit_idx) < <$unsigned>::BITS);
                    let mask: $unsigned = 1 << bit_idx;
                    if value {
                        *self |= mask;
                    } else {
                        *self &= !mask;
                    }
                }

                fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self {
                    let start = *bits_range.start();
                    let length = u32::from(*bits_range.end() - start) + 1;
                    debug_assert!(u32::from(start) + length <= <$unsigned>::BITS);

                    // Computed one size up so that a full-width range does not overflow.
                    let mask = ((1_u128 << length) - 1) as $unsigned;

                    (*self >> start) & mask
                }

                fn sign_extended(&self, number_of_bits: u8) -> Self {
                    debug_assert!(number_of_bits > 0);
                    let unused = <$unsigned>::BITS - u32::from(number_of_bits);

                    // Move the sign bit to the msb and let the arithmetic shift fill it back.
                    (((*self << unused) as $signed) >> unused) as $unsigned
                }
            }
        )*
    };
}

impl_bits!(u8 => i8, u16 => i16, u32 => i32, u64 => i64);
