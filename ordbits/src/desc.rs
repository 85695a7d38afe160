//! Field descriptors.

use crate::tag::Tag;

/// The compile-time description of one field: its tag, its width in bits, and
/// its default value.
///
/// Fixed fields are read-only. Padding is a fixed field carrying
/// [`Tag::PADDING`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDesc<T> {
    tag: T,
    width: u32,
    default: i128,
    fixed: bool,
}

impl<T: Tag> FieldDesc<T> {
    /// A writable field with a zero default.
    #[must_use]
    pub const fn new(tag: T, width: u32) -> Self {
        Self {
            tag,
            width,
            default: 0,
            fixed: false,
        }
    }

    /// A read-only field holding `value`.
    #[must_use]
    pub const fn fixed(tag: T, width: u32, value: i128) -> Self {
        Self {
            tag,
            width,
            default: value,
            fixed: true,
        }
    }

    /// Unnamed padding. Its bits stay zero.
    #[must_use]
    pub const fn padding(width: u32) -> Self {
        Self {
            tag: T::PADDING,
            width,
            default: 0,
            fixed: true,
        }
    }

    /// Replaces the default value. The value is truncated to the field width
    /// when the storage is initialized.
    #[must_use]
    pub const fn with_default(mut self, value: i128) -> Self {
        self.default = value;
        self
    }

    /// The field's tag.
    #[must_use]
    pub const fn tag(&self) -> T {
        self.tag
    }

    /// The field's width in bits.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The value the field holds in freshly initialized storage.
    #[must_use]
    pub const fn default_value(&self) -> i128 {
        self.default
    }

    /// Whether the field is read-only.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }
}
