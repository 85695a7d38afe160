//! Field tags.

use core::fmt::Debug;

/// Types that identify the fields of a bitfield struct.
///
/// A tag scheme is either text (`&'static str`, with the `str-tags` feature)
/// or an enumeration. Each scheme reserves one value, [`PADDING`](Self::PADDING),
/// for unnamed padding fields. Padding is never found by a tag lookup.
///
/// Enumerations named by `#[tags(...)]` in [`bitfield!`](crate::bitfield)
/// implement this trait themselves, usually with a dedicated padding variant.
/// Integers are not tags.
///
/// ```
/// use ordbits::Tag;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Reg {
///     Mode,
///     Ready,
///     Unused,
/// }
///
/// impl Tag for Reg {
///     const PADDING: Self = Reg::Unused;
/// }
/// ```
pub trait Tag: Copy + PartialEq + Debug {
    /// The tag carried by padding fields.
    const PADDING: Self;

    /// Returns whether this is the padding tag.
    #[inline(always)]
    fn is_padding(&self) -> bool {
        *self == Self::PADDING
    }
}

#[cfg(feature = "str-tags")]
#[cfg_attr(feature = "_nightly", doc(cfg(feature = "str-tags")))]
impl Tag for &'static str {
    const PADDING: Self = "";
}

/// Compares two strings in a const context.
#[must_use]
pub const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_eq_matches_byte_equality() {
        const SAME: bool = str_eq("mode", "mode");
        assert!(SAME);
        assert!(!str_eq("mode", "mod"));
        assert!(!str_eq("mode", "node"));
        assert!(str_eq("", ""));
    }

    #[cfg(feature = "str-tags")]
    #[test]
    fn empty_string_is_padding() {
        assert!("".is_padding());
        assert!(!"a".is_padding());
    }
}
