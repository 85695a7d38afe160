//! Storage unit types and their capabilities.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr};

use bytemuck::{Pod, Zeroable};
use num_traits::{One, WrappingAdd, WrappingMul, WrappingSub};

use crate::sealed::Sealed;

/// Types usable as the storage unit of a bitfield struct.
///
/// Every storage type supports the bitwise operators, so every field view
/// supports `=`, `&=`, `|=`, `^=`, `<<=`, and `>>=`. Arithmetic updates need the
/// additional [`Arithmetic`] capability.
///
/// This trait is sealed. It is implemented for the primitive integer types and
/// for [`Octet`].
pub trait Storage:
    Copy
    + Debug
    + Eq
    + Hash
    + Pod
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Sealed
{
    /// The width of one unit in bits.
    const BITS: u32;
    /// Whether right shifts replicate the sign bit.
    const SIGNED: bool;
    /// The unit with no bits set.
    const ZERO: Self;

    /// Truncates a bit pattern to the width of this type.
    fn from_bits(bits: u128) -> Self;

    /// Converts an integer to this type with `as`-cast truncation.
    fn from_i128(value: i128) -> Self;

    /// Shifts left, yielding zero once `n` reaches [`BITS`](Self::BITS).
    fn shift_left(self, n: u32) -> Self;

    /// Shifts right, yielding zero (or all ones for negative signed values)
    /// once `n` reaches [`BITS`](Self::BITS).
    fn shift_right(self, n: u32) -> Self;
}

/// Storage types that also support integer arithmetic.
///
/// Field views over these units gain `+=`, `-=`, `*=`, `/=`, `%=` and the
/// increment and decrement helpers. Results wrap and are then cut down to the
/// field's width, like the base type's operator followed by a masked store.
pub trait Arithmetic: Storage + One + WrappingAdd + WrappingSub + WrappingMul {
    /// Wrapping division. Panics if `rhs` is zero.
    fn wrapping_div(self, rhs: Self) -> Self;

    /// Wrapping remainder. Panics if `rhs` is zero.
    fn wrapping_rem(self, rhs: Self) -> Self;
}

macro_rules! impl_storage_for_primitives {
    ($($ty:ident: $signed:literal),* $(,)?) => {$(
        impl Sealed for $ty {}

        impl Storage for $ty {
            const BITS: u32 = <$ty>::BITS;
            const SIGNED: bool = $signed;
            const ZERO: Self = 0;

            #[inline(always)]
            fn from_bits(bits: u128) -> Self {
                bits as $ty
            }

            #[inline(always)]
            fn from_i128(value: i128) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn shift_left(self, n: u32) -> Self {
                self.checked_shl(n).unwrap_or(0)
            }

            #[inline(always)]
            fn shift_right(self, n: u32) -> Self {
                // `>> (BITS - 1) >> 1` is zero for unsigned types and the
                // sign fill for signed ones.
                self.checked_shr(n).unwrap_or(self >> (<$ty>::BITS - 1) >> 1)
            }
        }

        impl Arithmetic for $ty {
            #[inline(always)]
            fn wrapping_div(self, rhs: Self) -> Self {
                <$ty>::wrapping_div(self, rhs)
            }

            #[inline(always)]
            fn wrapping_rem(self, rhs: Self) -> Self {
                <$ty>::wrapping_rem(self, rhs)
            }
        }
    )*};
}

impl_storage_for_primitives!(
    u8: false,
    u16: false,
    u32: false,
    u64: false,
    u128: false,
    i8: true,
    i16: true,
    i32: true,
    i64: true,
    i128: true,
);

/// An 8-bit storage unit that supports only bitwise operations.
///
/// Fields stored in `Octet`s can be read, assigned, masked, and shifted, but
/// the arithmetic update operators are not available on their views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Octet(pub u8);

impl Octet {
    /// Returns the bits as a `u8`.
    #[inline(always)]
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self.0
    }
}

impl From<u8> for Octet {
    #[inline(always)]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Octet> for u8 {
    #[inline(always)]
    fn from(value: Octet) -> Self {
        value.0
    }
}

macro_rules! impl_octet_bitwise {
    ($($trait:ident::$method:ident $op:tt),*) => {$(
        impl $trait for Octet {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self(self.0 $op rhs.0)
            }
        }
    )*};
}
impl_octet_bitwise!(BitAnd::bitand &, BitOr::bitor |, BitXor::bitxor ^);

impl Not for Octet {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl Shl<u32> for Octet {
    type Output = Self;

    #[inline(always)]
    fn shl(self, rhs: u32) -> Self {
        self.shift_left(rhs)
    }
}

impl Shr<u32> for Octet {
    type Output = Self;

    #[inline(always)]
    fn shr(self, rhs: u32) -> Self {
        self.shift_right(rhs)
    }
}

impl Sealed for Octet {}

impl Storage for Octet {
    const BITS: u32 = 8;
    const SIGNED: bool = false;
    const ZERO: Self = Self(0);

    #[inline(always)]
    fn from_bits(bits: u128) -> Self {
        Self(bits as u8)
    }

    #[inline(always)]
    fn from_i128(value: i128) -> Self {
        Self(value as u8)
    }

    #[inline(always)]
    fn shift_left(self, n: u32) -> Self {
        Self(self.0.shift_left(n))
    }

    #[inline(always)]
    fn shift_right(self, n: u32) -> Self {
        Self(self.0.shift_right(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_saturate_at_unit_width() {
        assert_eq!(0x81u8.shift_left(8), 0);
        assert_eq!(0x81u8.shift_right(8), 0);
        assert_eq!((-2i8).shift_right(8), -1);
        assert_eq!(2i8.shift_right(9), 0);
        assert_eq!(1u128.shift_left(127), 1 << 127);
        assert_eq!(Octet(0xf0).shift_right(4), Octet(0x0f));
    }

    #[test]
    fn signed_shift_right_is_arithmetic() {
        assert_eq!((-128i8).shift_right(3), -16);
        assert_eq!(0x80u8.shift_right(3), 0x10);
    }

    #[test]
    fn conversions_truncate() {
        assert_eq!(u8::from_bits(0x1ff), 0xff);
        assert_eq!(i8::from_i128(-1), -1);
        assert_eq!(u16::from_i128(-1), 0xffff);
        assert_eq!(Octet::from_i128(0x123), Octet(0x23));
    }
}
