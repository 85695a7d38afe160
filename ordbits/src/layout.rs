//! The layout calculator.
//!
//! Fields are placed strictly in declaration order with a running bit cursor
//! that starts at zero:
//!
//! 1. A field of nonzero width that would straddle a unit boundary moves to
//!    the start of the next unit instead. Fields are never split.
//! 2. The field begins at the cursor.
//! 3. A zero-width field is a break: the cursor moves up to the next unit
//!    boundary (and stays put if it is already on one).
//! 4. Any other field advances the cursor by its width.
//!
//! The final cursor is the layout's total bit length, and the storage block
//! holds `ceil(total_bits / unit_bits)` units.
//!
//! A field wider than its unit occupies the whole unit from its begin bit up,
//! with the excess truncated by its mask. With the `strict-width` feature such
//! fields are rejected during constant evaluation instead.

use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;

use snafu::{ensure, OptionExt};

use crate::desc::FieldDesc;
use crate::error::{
    FieldError, FixedSnafu, NotFoundSnafu, OutOfRangeSnafu, ShortStorageSnafu, ZeroWidthSnafu,
};
use crate::storage::Storage;
use crate::tag::Tag;
use crate::view::{FieldMut, FieldRef};

/// Where one field lands, and where the cursor goes next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The field's first bit, counted from bit 0 of unit 0.
    pub begin: u32,
    /// The cursor after the field.
    pub next: u32,
}

/// Places one field of `width` bits at `cursor` in units of `unit_bits` bits.
///
/// This is one step of the layout algorithm described in the [module
/// docs](self). It performs no width checks.
#[must_use]
pub const fn place_field(cursor: u32, width: u32, unit_bits: u32) -> Placement {
    let mut begin = cursor;
    if width > 0 && begin / unit_bits != (begin + width - 1) / unit_bits {
        begin = align_up(begin, unit_bits);
    }
    let next = if width == 0 {
        align_up(begin, unit_bits)
    } else {
        begin + width
    };
    Placement { begin, next }
}

const fn align_up(bit: u32, unit_bits: u32) -> u32 {
    (bit + unit_bits - 1) / unit_bits * unit_bits
}

const fn check_width(width: u32, unit_bits: u32) {
    if cfg!(feature = "strict-width") && width > unit_bits {
        panic!("field is wider than its storage unit");
    }
}

/// Returns a mask of `min(width, 128)` bits starting at bit `shift`.
///
/// Bits that would land above bit 127 are dropped. Callers clamp `width` to
/// the unit width first, so the mask fits the unit.
#[must_use]
pub const fn unit_mask(shift: u32, width: u32) -> u128 {
    if width == 0 {
        0
    } else if width >= u128::BITS {
        u128::MAX << shift
    } else {
        ((1u128 << width) - 1) << shift
    }
}

/// Returns the number of `S` units needed for fields of the given widths.
///
/// Runs the same placement as [`Layout::new`].
#[must_use]
pub const fn storage_len<S: Storage>(widths: &[u32]) -> usize {
    let mut cursor = 0;
    let mut i = 0;
    while i < widths.len() {
        check_width(widths[i], S::BITS);
        cursor = place_field(cursor, widths[i], S::BITS).next;
        i += 1;
    }
    align_up(cursor, S::BITS) as usize / S::BITS as usize
}

/// Computed placement of every field in a declared layout.
///
/// `T` is the tag type, `S` the storage unit, and `N` the number of fields.
/// A `Layout` is built once, as a constant, and shared by every value of the
/// type that declared it.
#[derive(Clone, Copy)]
pub struct Layout<T, S, const N: usize> {
    tags: [T; N],
    widths: [u32; N],
    begin_bits: [u32; N],
    total_bits: u32,
    mask_bits: [u128; N],
    defaults: [i128; N],
    fixed: [bool; N],
    _storage: PhantomData<S>,
}

impl<T: Tag, S: Storage, const N: usize> Layout<T, S, N> {
    /// Runs the layout algorithm over `fields`.
    ///
    /// # Panics
    ///
    /// With the `strict-width` feature, panics if a field is wider than `S`.
    /// In a constant this is a compile error.
    #[must_use]
    pub const fn new(fields: &[FieldDesc<T>; N]) -> Self {
        let mut layout = Self {
            tags: [T::PADDING; N],
            widths: [0; N],
            begin_bits: [0; N],
            total_bits: 0,
            mask_bits: [0; N],
            defaults: [0; N],
            fixed: [false; N],
            _storage: PhantomData,
        };

        let mut cursor = 0;
        let mut i = 0;
        while i < N {
            let field = &fields[i];
            let width = field.width();
            check_width(width, S::BITS);

            let placement = place_field(cursor, width, S::BITS);
            let clamped = if width < S::BITS { width } else { S::BITS };

            layout.tags[i] = field.tag();
            layout.widths[i] = width;
            layout.begin_bits[i] = placement.begin;
            layout.mask_bits[i] = unit_mask(placement.begin % S::BITS, clamped);
            layout.defaults[i] = field.default_value();
            layout.fixed[i] = field.is_fixed();

            cursor = placement.next;
            i += 1;
        }
        layout.total_bits = cursor;
        layout
    }

    /// The number of fields, padding included.
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the layout declares no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// The width of one storage unit in bits.
    #[must_use]
    pub const fn unit_bits(&self) -> u32 {
        S::BITS
    }

    /// The tag of field `i`.
    #[must_use]
    pub const fn tag(&self, i: usize) -> T {
        self.tags[i]
    }

    /// The declared width of field `i`.
    #[must_use]
    pub const fn width(&self, i: usize) -> u32 {
        self.widths[i]
    }

    /// The number of bits of field `i` that are actually stored.
    #[must_use]
    pub const fn masked_width(&self, i: usize) -> u32 {
        let width = self.widths[i];
        if width < S::BITS {
            width
        } else {
            S::BITS
        }
    }

    /// The begin bit of field `i`. `begin_bit(len())` is the total bit length.
    #[must_use]
    pub const fn begin_bit(&self, i: usize) -> u32 {
        if i == N {
            self.total_bits
        } else {
            self.begin_bits[i]
        }
    }

    /// The cursor after the last field.
    #[must_use]
    pub const fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// The number of storage units in a block.
    #[must_use]
    pub const fn data_size(&self) -> usize {
        align_up(self.total_bits, S::BITS) as usize / S::BITS as usize
    }

    /// The index of the unit holding field `i`.
    #[must_use]
    pub const fn unit_index(&self, i: usize) -> usize {
        (self.begin_bits[i] / S::BITS) as usize
    }

    /// The position of field `i`'s low bit within its unit.
    #[must_use]
    pub const fn shift(&self, i: usize) -> u32 {
        self.begin_bits[i] % S::BITS
    }

    /// Field `i`'s mask within its unit, as a bit pattern.
    #[must_use]
    pub const fn mask_bits(&self, i: usize) -> u128 {
        self.mask_bits[i]
    }

    /// Field `i`'s declared default value before truncation.
    #[must_use]
    pub const fn default_bits(&self, i: usize) -> i128 {
        self.defaults[i]
    }

    /// Whether field `i` is read-only.
    #[must_use]
    pub const fn is_fixed(&self, i: usize) -> bool {
        self.fixed[i]
    }

    /// Field `i`'s mask within its unit.
    #[must_use]
    pub fn mask(&self, i: usize) -> S {
        S::from_bits(self.mask_bits[i])
    }

    /// Field `i`'s default value, truncated to the unit type.
    #[must_use]
    pub fn default_value(&self, i: usize) -> S {
        S::from_i128(self.defaults[i])
    }

    /// Returns the index of the first field tagged `tag`.
    ///
    /// Padding is skipped, so looking up [`Tag::PADDING`] finds nothing.
    #[must_use]
    pub fn position(&self, tag: T) -> Option<usize> {
        if tag.is_padding() {
            return None;
        }
        self.tags.iter().position(|t| *t == tag)
    }

    /// Builds a storage block holding every field's default value.
    ///
    /// # Panics
    ///
    /// Panics if `M` is not [`data_size()`](Self::data_size).
    #[must_use]
    pub fn init<const M: usize>(&self) -> [S; M] {
        assert_eq!(M, self.data_size(), "storage block has the wrong length");
        let mut units = [S::ZERO; M];
        for i in 0..N {
            // Zero-width fields have no bits, and may sit one unit past the end.
            if self.widths[i] == 0 {
                continue;
            }
            let unit = &mut units[self.unit_index(i)];
            let mask = self.mask(i);
            *unit = (*unit & !mask) | (self.default_value(i).shift_left(self.shift(i)) & mask);
        }
        units
    }

    /// Builds the native-endian bytes of the storage block [`init`](Self::init)
    /// returns, in a constant context.
    ///
    /// # Panics
    ///
    /// Panics if `B` is not the block's size in bytes.
    #[must_use]
    pub const fn init_bytes<const B: usize>(&self) -> [u8; B] {
        let unit_bytes = core::mem::size_of::<S>();
        assert!(
            B == self.data_size() * unit_bytes,
            "storage block has the wrong length"
        );
        // Where the unit's low bytes sit within a native-endian `u128`.
        let skip = if cfg!(target_endian = "little") {
            0
        } else {
            16 - unit_bytes
        };
        let mut bytes = [0; B];
        let mut i = 0;
        while i < N {
            if self.widths[i] > 0 {
                let mask = self.mask_bits[i];
                let value = ((self.defaults[i] as u128) << self.shift(i)) & mask;
                let mask = mask.to_ne_bytes();
                let value = value.to_ne_bytes();
                let base = self.unit_index(i) * unit_bytes;
                let mut b = 0;
                while b < unit_bytes {
                    let byte = &mut bytes[base + b];
                    *byte = (*byte & !mask[skip + b]) | value[skip + b];
                    b += 1;
                }
            }
            i += 1;
        }
        bytes
    }

    fn locate(&self, len: usize, i: usize) -> Result<usize, FieldError> {
        ensure!(
            i < N,
            OutOfRangeSnafu {
                index: i,
                fields: N
            }
        );
        ensure!(self.widths[i] > 0, ZeroWidthSnafu { index: i });
        let needed = self.data_size();
        ensure!(len >= needed, ShortStorageSnafu { needed, len });
        Ok(self.unit_index(i))
    }

    /// Binds a read-only view of field `i` in `units`.
    pub fn field<'a>(&self, units: &'a [S], i: usize) -> Result<FieldRef<'a, S>, FieldError> {
        let unit = self.locate(units.len(), i)?;
        Ok(FieldRef::new(
            &units[unit],
            self.shift(i),
            self.masked_width(i),
        ))
    }

    /// Binds a read/write view of field `i` in `units`.
    ///
    /// Fails with [`FieldError::Fixed`] for fixed fields and padding.
    pub fn field_mut<'a>(
        &self,
        units: &'a mut [S],
        i: usize,
    ) -> Result<FieldMut<'a, S>, FieldError> {
        let unit = self.locate(units.len(), i)?;
        ensure!(!self.fixed[i], FixedSnafu { index: i });
        Ok(FieldMut::new(
            &mut units[unit],
            self.shift(i),
            self.masked_width(i),
        ))
    }

    /// Binds a read-only view of the field tagged `tag`.
    pub fn find<'a>(&self, units: &'a [S], tag: T) -> Result<FieldRef<'a, S>, FieldError> {
        let i = self.position(tag).context(NotFoundSnafu)?;
        self.field(units, i)
    }

    /// Binds a read/write view of the field tagged `tag`.
    pub fn find_mut<'a>(
        &self,
        units: &'a mut [S],
        tag: T,
    ) -> Result<FieldMut<'a, S>, FieldError> {
        let i = self.position(tag).context(NotFoundSnafu)?;
        self.field_mut(units, i)
    }
}

impl<T: Tag, S: Storage, const N: usize> Debug for Layout<T, S, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        struct Row<'a, T> {
            tag: &'a T,
            width: u32,
            begin: u32,
            mask: u128,
            fixed: bool,
        }

        impl<T: Debug> Debug for Row<'_, T> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{:?}: {} @ {} mask {:#x}{}",
                    self.tag,
                    self.width,
                    self.begin,
                    self.mask,
                    if self.fixed { " fixed" } else { "" },
                )
            }
        }

        let mut list = f.debug_list();
        for i in 0..N {
            list.entry(&Row {
                tag: &self.tags[i],
                width: self.widths[i],
                begin: self.begin_bits[i],
                mask: self.mask_bits[i],
                fixed: self.fixed[i],
            });
        }
        list.finish()
    }
}
