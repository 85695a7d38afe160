//! Example invocations, generated types, and usage.
//!
//! # Reading and Writing
//!
//! ```
//! use ordbits::doc::example::Status;
//! use ordbits::prelude::*;
//!
//! let mut status = Status::new();
//! assert_eq!(status.ready().get(), 1);
//! assert_eq!(status.revision().get(), 2);
//!
//! status.mode_mut().set(5);
//! let mut errors = status.errors_mut();
//! errors += 30;
//! errors.inc();
//! errors.inc();
//! assert_eq!(errors.get(), 0);
//!
//! let mut mode = field_mut!(Status, status, "mode");
//! mode ^= 0b111;
//! assert_eq!(field!(Status, status, "mode").get(), 0b010);
//!
//! // `revision` starts a new unit because of the `_: 0` break.
//! assert_eq!(status.data(), &[0b0000_1010, 0b0000_0010]);
//! ```
//!
//! # Runtime Lookup
//!
//! ```
//! use ordbits::doc::example::{Control, ControlTag};
//! use ordbits::prelude::*;
//! use ordbits::FieldError;
//!
//! let mut control = Control::new();
//! assert_eq!(control.find(ControlTag::Level).unwrap().get(), -3);
//! control.find_mut(ControlTag::Mode).unwrap().set(-1);
//! assert_eq!(control.mode().get(), -1);
//! assert_eq!(
//!     control.find(ControlTag::Unused).unwrap_err(),
//!     FieldError::NotFound,
//! );
//! ```
//!
//! # Compile-time Rejections
//!
//! Fixed fields have no write access:
//!
//! ```compile_fail
//! # use ordbits::doc::example::Status;
//! let mut status = Status::new();
//! status.revision_mut().set(1);
//! ```
//!
//! ```compile_fail
//! # use ordbits::doc::example::Status;
//! # use ordbits::prelude::*;
//! let mut status = Status::new();
//! field_mut!(Status, status, "revision").set(1);
//! ```
//!
//! Unknown tags and padding are not addressable:
//!
//! ```compile_fail
//! # use ordbits::doc::example::Status;
//! # use ordbits::prelude::*;
//! let status = Status::new();
//! let _ = field!(Status, status, "voltage");
//! ```
//!
//! ```compile_fail
//! # use ordbits::doc::example::Status;
//! let status = Status::new();
//! let _ = status.get::<2>();
//! ```
//!
//! Arithmetic is unavailable on units without it:
//!
//! ```compile_fail
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Bytes: Octet { low: 4 }
//! }
//! let mut bytes = Bytes::new();
//! let mut low = bytes.low_mut();
//! low += Octet(1);
//! ```
//!
//! Storage units must be [`Storage`](crate::Storage) types:
//!
//! ```compile_fail
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Floats: f32 { a: 3 }
//! }
//! ```
//!
//! Integers cannot be tags:
//!
//! ```compile_fail
//! use ordbits::{FieldDesc, Layout};
//!
//! const NUMBERED: Layout<u8, u8, 1> = Layout::new(&[FieldDesc::new(3u8, 1)]);
//! ```
//!
//! A named field cannot carry the padding tag:
//!
//! ```compile_fail
//! # use ordbits::prelude::*;
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! enum Reg {
//!     Mode,
//!     Spare,
//! }
//!
//! impl Tag for Reg {
//!     const PADDING: Self = Reg::Spare;
//! }
//!
//! bitfield! {
//!     #[tags(Reg)]
//!     struct Clash: u8 { mode: 3, spare: 2 = 3 }
//! }
//! ```
//!
//! Malformed declarations are reported by the macro:
//!
//! ```compile_fail
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Duplicated: u8 { a: 3, a: 1, b: 0 }
//! }
//! ```

use crate::tag::Tag;

crate::bitfield! {
    /// A status register packed into `u8` units with string tags.
    ///
    /// # Declaration
    ///
    /// ```
    /// # use ordbits::prelude::*;
    /// bitfield! {
    ///     pub struct Status: u8 {
    ///         pub mode: 3,
    ///         pub ready: 1 = 1,
    ///         _: 0,
    ///         pub const revision: 2 = 2,
    ///         pub errors: 5,
    ///     }
    /// }
    /// ```
    pub struct Status: u8 {
        /// The operating mode.
        pub mode: 3,
        /// Whether the device is ready. Starts out set.
        pub ready: 1 = 1,
        _: 0,
        /// The hardware revision. Read-only.
        pub const revision: 2 = 2,
        /// A wrapping error counter.
        pub errors: 5,
    }

    /// A control word packed into `i16` units with enum tags.
    ///
    /// # Declaration
    ///
    /// ```
    /// # use ordbits::prelude::*;
    /// # use ordbits::doc::example::ControlTag;
    /// bitfield! {
    ///     #[tags(ControlTag)]
    ///     pub struct Control: i16 {
    ///         pub mode: 4,
    ///         _: 2,
    ///         pub level: 6 = -3,
    ///     }
    /// }
    /// ```
    #[tags(ControlTag)]
    pub struct Control: i16 {
        /// A signed mode selector.
        pub mode: 4,
        _: 2,
        /// A signed level.
        pub level: 6 = -3,
    }
}

/// Tags naming the fields of [`Control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlTag {
    /// [`Control::mode`].
    Mode,
    /// [`Control::level`].
    Level,
    /// Padding.
    Unused,
}

impl Tag for ControlTag {
    const PADDING: Self = ControlTag::Unused;
}
