//! Borrowed windows onto one field.
//!
//! A view holds a reference to the single storage unit that contains its field,
//! the field's shift within that unit, and its (clamped) width. Reads mask and
//! shift the unit; writes are masked read-modify-write cycles on the unit, so
//! neighboring fields are never disturbed.
//!
//! [`FieldRef`] only reads. [`FieldMut`] also writes and implements the compound
//! assignment operators its unit type supports: `&=`, `|=`, `^=`, `<<=` and
//! `>>=` for every [`Storage`], and `+=`, `-=`, `*=`, `/=`, `%=` plus the
//! increment and decrement helpers for [`Arithmetic`] units. Compound operators
//! combine the field's current value (as [`get`](FieldMut::get) reports it)
//! with the operand and store the result through the mask.

use core::fmt::{self, Debug, Formatter};

use paste::paste;

use crate::layout::unit_mask;
use crate::storage::{Arithmetic, Storage};

/// Extracts a field value, sign-extending from the field's top bit when `S`
/// is signed.
#[inline(always)]
fn read<S: Storage>(unit: S, shift: u32, width: u32, mask: S) -> S {
    let lead = S::BITS - shift - width;
    (unit & mask).shift_left(lead).shift_right(shift + lead)
}

#[inline(always)]
fn write<S: Storage>(unit: &mut S, shift: u32, mask: S, value: S) {
    *unit = (*unit & !mask) | (value.shift_left(shift) & mask);
}

/// A read-only view of one field.
#[derive(Clone, Copy)]
pub struct FieldRef<'a, S> {
    unit: &'a S,
    shift: u32,
    width: u32,
    mask: S,
}

impl<'a, S: Storage> FieldRef<'a, S> {
    #[inline(always)]
    pub(crate) fn new(unit: &'a S, shift: u32, width: u32) -> Self {
        Self {
            unit,
            shift,
            width,
            mask: S::from_bits(unit_mask(shift, width)),
        }
    }

    /// Reads the field.
    ///
    /// The value is masked to the field's width, then sign-extended from the
    /// field's top bit if the unit type is signed.
    #[inline(always)]
    #[must_use]
    pub fn get(&self) -> S {
        read(*self.unit, self.shift, self.width, self.mask)
    }

    /// The position of the field's low bit within its unit.
    #[inline(always)]
    #[must_use]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// The number of stored bits.
    #[inline(always)]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The field's bits within its unit.
    #[inline(always)]
    #[must_use]
    pub fn mask(&self) -> S {
        self.mask
    }
}

/// A read/write view of one field.
pub struct FieldMut<'a, S> {
    unit: &'a mut S,
    shift: u32,
    width: u32,
    mask: S,
}

impl<'a, S: Storage> FieldMut<'a, S> {
    #[inline(always)]
    pub(crate) fn new(unit: &'a mut S, shift: u32, width: u32) -> Self {
        Self {
            unit,
            shift,
            width,
            mask: S::from_bits(unit_mask(shift, width)),
        }
    }

    /// Reads the field. See [`FieldRef::get`].
    #[inline(always)]
    #[must_use]
    pub fn get(&self) -> S {
        read(*self.unit, self.shift, self.width, self.mask)
    }

    /// Stores the low bits of `value` in the field.
    #[inline(always)]
    pub fn set(&mut self, value: S) {
        write(self.unit, self.shift, self.mask, value);
    }

    /// Stores `value` and returns the previous field value.
    #[inline(always)]
    pub fn replace(&mut self, value: S) -> S {
        let old = self.get();
        self.set(value);
        old
    }

    /// Stores `f(old)` and returns `old`.
    #[inline(always)]
    pub fn update(&mut self, f: impl FnOnce(S) -> S) -> S {
        let old = self.get();
        self.set(f(old));
        old
    }

    /// Borrows this view as a read-only view.
    #[inline(always)]
    #[must_use]
    pub fn to_ref(&self) -> FieldRef<'_, S> {
        FieldRef {
            unit: &*self.unit,
            shift: self.shift,
            width: self.width,
            mask: self.mask,
        }
    }

    /// Reborrows this view for a shorter lifetime.
    #[inline(always)]
    pub fn reborrow(&mut self) -> FieldMut<'_, S> {
        FieldMut {
            unit: &mut *self.unit,
            shift: self.shift,
            width: self.width,
            mask: self.mask,
        }
    }

    /// The position of the field's low bit within its unit.
    #[inline(always)]
    #[must_use]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// The number of stored bits.
    #[inline(always)]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The field's bits within its unit.
    #[inline(always)]
    #[must_use]
    pub fn mask(&self) -> S {
        self.mask
    }
}

impl<S: Arithmetic> FieldMut<'_, S> {
    /// Adds one and returns the view, like a prefix increment.
    #[inline(always)]
    pub fn inc(&mut self) -> &mut Self {
        *self += S::one();
        self
    }

    /// Subtracts one and returns the view, like a prefix decrement.
    #[inline(always)]
    pub fn dec(&mut self) -> &mut Self {
        *self -= S::one();
        self
    }

    /// Adds one and returns the previous value, like a postfix increment.
    #[inline(always)]
    pub fn post_inc(&mut self) -> S {
        let old = self.get();
        *self += S::one();
        old
    }

    /// Subtracts one and returns the previous value, like a postfix decrement.
    #[inline(always)]
    pub fn post_dec(&mut self) -> S {
        let old = self.get();
        *self -= S::one();
        old
    }
}

macro_rules! impl_assign_ops {
    ($bound:ident: $($trait:ident::$method:ident($a:ident, $b:ident) => $body:expr),* $(,)?) => {
        paste! {$(
            impl<S: $bound> ::core::ops::[<$trait Assign>]<S> for FieldMut<'_, S> {
                #[inline(always)]
                fn [<$method _assign>](&mut self, rhs: S) {
                    let $a = self.get();
                    let $b = rhs;
                    self.set($body);
                }
            }
        )*}
    };
}

impl_assign_ops!(Arithmetic:
    Add::add(a, b) => a.wrapping_add(&b),
    Sub::sub(a, b) => a.wrapping_sub(&b),
    Mul::mul(a, b) => a.wrapping_mul(&b),
    Div::div(a, b) => Arithmetic::wrapping_div(a, b),
    Rem::rem(a, b) => Arithmetic::wrapping_rem(a, b),
);

impl_assign_ops!(Storage:
    BitAnd::bitand(a, b) => a & b,
    BitOr::bitor(a, b) => a | b,
    BitXor::bitxor(a, b) => a ^ b,
);

impl<S: Storage> ::core::ops::ShlAssign<u32> for FieldMut<'_, S> {
    #[inline(always)]
    fn shl_assign(&mut self, rhs: u32) {
        self.set(self.get().shift_left(rhs));
    }
}

impl<S: Storage> ::core::ops::ShrAssign<u32> for FieldMut<'_, S> {
    #[inline(always)]
    fn shr_assign(&mut self, rhs: u32) {
        self.set(self.get().shift_right(rhs));
    }
}

impl<S: Storage> PartialEq<S> for FieldRef<'_, S> {
    fn eq(&self, other: &S) -> bool {
        self.get() == *other
    }
}

impl<S: Storage> PartialEq<S> for FieldMut<'_, S> {
    fn eq(&self, other: &S) -> bool {
        self.get() == *other
    }
}

impl<S: Storage> Debug for FieldRef<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.get(), f)
    }
}

impl<S: Storage> Debug for FieldMut<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Octet;

    #[test]
    fn read_masks_neighbors() {
        let unit = 0b1011_0110u8;
        assert_eq!(FieldRef::new(&unit, 0, 3).get(), 0b110);
        assert_eq!(FieldRef::new(&unit, 3, 1).get(), 0);
        assert_eq!(FieldRef::new(&unit, 4, 4).get(), 0b1011);
    }

    #[test]
    fn signed_read_extends_from_field_top_bit() {
        let unit = 0b0000_1110i8;
        assert_eq!(FieldRef::new(&unit, 1, 3).get(), -1);
        assert_eq!(FieldRef::new(&unit, 0, 3).get(), -2);
        assert_eq!(FieldRef::new(&unit, 1, 4).get(), 7);
        let full = -3i32;
        assert_eq!(FieldRef::new(&full, 0, 32).get(), -3);
    }

    #[test]
    fn write_touches_only_the_mask() {
        let mut unit = 0xffu8;
        FieldMut::new(&mut unit, 2, 3).set(0);
        assert_eq!(unit, 0b1110_0011);
        FieldMut::new(&mut unit, 2, 3).set(0xff);
        assert_eq!(unit, 0xff);
    }

    #[test]
    fn compound_ops_wrap_to_field_width() {
        let mut unit = 0u8;
        let mut f = FieldMut::new(&mut unit, 4, 4);
        f += 15;
        f += 2;
        assert_eq!(f.get(), 1);
        f -= 3;
        assert_eq!(f.get(), 14);
        f <<= 1;
        assert_eq!(f.get(), 12);
        f >>= 9;
        assert_eq!(f.get(), 0);
        assert_eq!(unit, 0);
    }

    #[test]
    fn increments() {
        let mut unit = 0i16;
        let mut f = FieldMut::new(&mut unit, 3, 3);
        assert_eq!(f.post_inc(), 0);
        assert_eq!(f.inc().get(), 2);
        f.set(3);
        assert_eq!(f.post_inc(), 3);
        assert_eq!(f.get(), -4);
        f.dec();
        assert_eq!(f.get(), 3);
        assert_eq!(f.post_dec(), 3);
        assert_eq!(f.get(), 2);
    }

    #[test]
    fn octet_bitwise() {
        let mut unit = Octet(0);
        let mut f = FieldMut::new(&mut unit, 1, 3);
        f |= Octet(0b101);
        f ^= Octet(0b011);
        assert_eq!(f, Octet(0b110));
        f &= Octet(0b010);
        assert_eq!(f.get(), Octet(0b010));
        assert_eq!(unit, Octet(0b100));
    }

    #[test]
    fn replace_and_update_return_the_old_value() {
        let mut unit = 0u32;
        let mut f = FieldMut::new(&mut unit, 8, 8);
        assert_eq!(f.replace(7), 0);
        assert_eq!(f.update(|v| v * 3), 7);
        assert_eq!(f.to_ref().get(), 21);
        assert_eq!(unit, 21 << 8);
    }
}
