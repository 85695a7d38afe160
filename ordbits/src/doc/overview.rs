//! An overview of `ordbits` concepts and terms.
//!
//! # Bitfield Structs
//!
//! The [`bitfield!`](crate::bitfield) macro generates bitfield structs. A
//! bitfield struct is declared with an ordered list of fields and a storage
//! unit type. The fields are not Rust struct fields: they live in computed bit
//! ranges of a fixed-size array of units, the storage block, and are reached
//! through views.
//!
//! # Storage Units
//!
//! The unit type is any [`Storage`](crate::Storage) type: the primitive
//! integers `u8` through `u128` and `i8` through `i128`, or
//! [`Octet`](crate::Octet), a byte that only supports bitwise operations. A
//! struct's storage block is `[Unit; DATA_SIZE]`, where `DATA_SIZE` is just
//! large enough for the last field.
//!
//! # Layout Rules
//!
//! Fields are placed in declaration order, starting at bit 0 of unit 0:
//!
//! - A field that fits in what is left of the current unit goes right after
//!   the previous one.
//! - A field that would straddle two units starts at bit 0 of the next unit.
//!   The bits it skipped stay zero.
//! - A zero-width padding field, `_: 0`, moves the next field to the next unit
//!   even when the current one has room.
//!
//! ```
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Packed: u8 { a: 3, b: 1, c: 1 }
//!     struct Pushed: u8 { a: 3, b: 1, c: 5 }
//!     struct Broken: u8 { a: 3, b: 1, _: 0, c: 1 }
//! }
//!
//! assert_eq!(Packed::DATA_SIZE, 1);
//! assert_eq!(Packed::LAYOUT.begin_bit(2), 4);
//!
//! assert_eq!(Pushed::DATA_SIZE, 2);
//! assert_eq!(Pushed::LAYOUT.begin_bit(2), 8);
//!
//! assert_eq!(Broken::DATA_SIZE, 2);
//! assert_eq!(Broken::LAYOUT.begin_bit(3), 8);
//! ```
//!
//! A field wider than its unit keeps only the unit's worth of bits. With the
//! `strict-width` feature such declarations fail to compile instead. Fields
//! never span units.
//!
#![cfg_attr(feature = "strict-width", doc = "```compile_fail")]
#![cfg_attr(not(feature = "strict-width"), doc = "```")]
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Wide: u8 { a: 9 }
//! }
//! let wide = Wide::new().with_a(0xff);
//! assert_eq!(wide.a().get(), 0xff);
//! assert_eq!(Wide::DATA_SIZE, 2);
//! ```
//!
//! The computed [`Layout`](crate::Layout) is available as the struct's
//! `LAYOUT` constant. Decoding the storage block by hand with its
//! [`unit_index`](crate::Layout::unit_index), [`shift`](crate::Layout::shift),
//! and [`mask`](crate::Layout::mask) gives the same values the views report.
//!
//! # Tags
//!
//! Every named field has a tag. By default tags are strings equal to the field
//! names. The `#[tags(Enum)]` struct attribute switches to enum tags, deriving
//! each tag from the field name in `UpperCamelCase`, and a `#[tag(...)]` field
//! attribute overrides a single tag. Padding carries the scheme's
//! [`PADDING`](crate::Tag::PADDING) tag and cannot be looked up. A named field
//! whose enum tag is the padding tag is a compile error.
//!
//! Tags resolve to positions with the generated `const fn index`. The
//! [`field!`](crate::field) and [`field_mut!`](crate::field_mut) macros
//! resolve a tag during compilation, so unknown tags are compile errors.
//! [`Bitfield::find`](crate::Bitfield::find) resolves tags at run time.
//!
//! # Views
//!
//! [`FieldRef`](crate::FieldRef) reads one field. [`FieldMut`](crate::FieldMut)
//! also writes it and supports the compound assignment operators of its unit
//! type. Arithmetic wraps and the result is cut to the field's width.
//!
//! Reads of signed units are sign-extended from the field's own top bit:
//!
//! ```
//! # use ordbits::prelude::*;
//! bitfield! {
//!     struct Signed: i8 { low: 4, high: 4 }
//! }
//!
//! let mut value = Signed::new();
//! value.high_mut().set(7);
//! let mut high = value.high_mut();
//! high += 1;
//! assert_eq!(value.high().get(), -8);
//! assert_eq!(value.low().get(), 0);
//! ```
//!
//! # Fixed Fields
//!
//! Fields declared `const` hold their default forever. They only have
//! read-only accessors, so writes are compile errors.
