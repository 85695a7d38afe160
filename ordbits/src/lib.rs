#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "_nightly", feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod desc;
pub mod doc;
pub mod error;
pub mod layout;
pub mod prelude;
pub mod storage;
pub mod tag;
pub mod view;

pub use desc::FieldDesc;
pub use error::FieldError;
pub use layout::Layout;
pub use storage::{Arithmetic, Octet, Storage};
pub use tag::Tag;
pub use view::{FieldMut, FieldRef};

mod sealed {
    pub trait Sealed {}
}

#[doc(hidden)]
pub mod __private {
    use crate::storage::Storage;
    use crate::view::{FieldMut, FieldRef};

    pub use bytemuck;
    pub use ordbits_macros::bitfield;

    pub use crate::layout::storage_len;
    pub use crate::tag::str_eq;

    #[inline(always)]
    pub fn field_ref<S: Storage>(unit: &S, shift: u32, width: u32) -> FieldRef<'_, S> {
        FieldRef::new(unit, shift, width)
    }

    #[inline(always)]
    pub fn field_mut<S: Storage>(unit: &mut S, shift: u32, width: u32) -> FieldMut<'_, S> {
        FieldMut::new(unit, shift, width)
    }
}

/// Access to the field at position `I` of a bitfield struct.
///
/// Implemented by [`bitfield!`] for every named field. Padding has no
/// implementation.
pub trait FieldAt<const I: usize> {
    /// The storage unit type.
    type Unit: Storage;

    /// Returns a read-only view of the field.
    fn field(&self) -> FieldRef<'_, Self::Unit>;
}

/// Write access to the field at position `I` of a bitfield struct.
///
/// Implemented by [`bitfield!`] for every named field that is not fixed, so
/// writing a fixed field through [`get_mut`](crate::doc::example::Status::get_mut)
/// or [`field_mut!`] does not compile.
pub trait FieldAtMut<const I: usize>: FieldAt<I> {
    /// Returns a read/write view of the field.
    fn field_mut(&mut self) -> FieldMut<'_, Self::Unit>;
}

/// Common interface of bitfield structs.
///
/// The lookups here take tags known only at run time and report failures
/// through [`FieldError`]. Prefer the generated accessors, [`field!`], and
/// [`field_mut!`] when the tag is a constant.
pub trait Bitfield: Copy + Default {
    /// The tag type naming the fields.
    type Tag: Tag;

    /// The storage unit type.
    type Unit: Storage;

    /// Returns the storage block.
    fn units(&self) -> &[Self::Unit];

    /// Returns the storage block for direct modification.
    fn units_mut(&mut self) -> &mut [Self::Unit];

    /// Returns the position of the named field tagged `tag`.
    fn position(tag: Self::Tag) -> Option<usize>;

    /// Returns a read-only view of the field tagged `tag`.
    fn find(&self, tag: Self::Tag) -> Result<FieldRef<'_, Self::Unit>, FieldError>;

    /// Returns a read/write view of the field tagged `tag`.
    ///
    /// Fails with [`FieldError::Fixed`] for fixed fields.
    fn find_mut(&mut self, tag: Self::Tag) -> Result<FieldMut<'_, Self::Unit>, FieldError>;
}

/// Generates bitfield structs with an ordered, deterministic layout.
///
/// See the [`doc`] module for an [overview of concepts and terms](doc::overview) and
/// [examples](doc::example).
///
/// # Syntax
///
/// ```text
/// bitfield! {
///     #[tags(TagEnum)]              // optional; string tags otherwise
///     #[other_attributes]
///     vis struct Name: Unit {
///         #[tag("text")]            // optional tag override
///         vis name: width,
///         vis name: width = default,
///         vis const name: width = value,
///         _: width,                 // padding; width 0 breaks to the next unit
///     }
///     // more structs...
/// }
/// ```
///
/// `Unit` must implement [`Storage`]. Widths are integer literals. Defaults are
/// constant expressions converted to `i128` and truncated to the field.
#[macro_export]
macro_rules! bitfield {
    ($($tt:tt)*) => {
        $crate::__private::bitfield! { ($crate, $($tt)*) }
    };
}

/// Returns a read-only view of the field of `$value` tagged `$tag`.
///
/// `$ty` is the bitfield struct type and `$tag` a constant. Unknown tags fail to
/// compile.
#[macro_export]
macro_rules! field {
    ($ty:ty, $value:expr, $tag:expr $(,)?) => {
        $value.get::<{ <$ty>::index($tag) }>()
    };
}

/// Returns a read/write view of the field of `$value` tagged `$tag`.
///
/// Unknown tags and fixed fields fail to compile.
#[macro_export]
macro_rules! field_mut {
    ($ty:ty, $value:expr, $tag:expr $(,)?) => {
        $value.get_mut::<{ <$ty>::index($tag) }>()
    };
}

#[test]
fn trybuild_tests() {
    let t = trybuild::TestCases::new();
    t.pass("tests_pass/*.rs");
}
