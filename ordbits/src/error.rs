//! Runtime lookup errors.

use snafu::Snafu;

/// Errors from runtime field lookups.
///
/// The tag-based accessors generated by [`bitfield!`](crate::bitfield) report
/// these conditions at compile time instead. This type is for code that picks
/// fields by a value only known at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FieldError {
    /// No field carries the tag. Padding never matches.
    #[snafu(display("no field has the requested tag"))]
    NotFound,

    /// The index is past the last field.
    #[snafu(display("field index {index} is out of range for {fields} fields"))]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The number of fields in the layout.
        fields: usize,
    },

    /// The field occupies no bits.
    #[snafu(display("field {index} has zero width and no storage"))]
    ZeroWidth {
        /// The field's index.
        index: usize,
    },

    /// A mutable view was requested for a read-only field.
    #[snafu(display("field {index} is fixed and cannot be written"))]
    Fixed {
        /// The field's index.
        index: usize,
    },

    /// The unit slice is shorter than the layout's data size.
    #[snafu(display("storage has {len} units but the layout needs {needed}"))]
    ShortStorage {
        /// The layout's data size.
        needed: usize,
        /// The slice length.
        len: usize,
    },
}
