//! Glob-importable names for declaring and using bitfield structs.

#[doc(no_inline)]
pub use crate::{
    bitfield, field, field_mut, Arithmetic, Bitfield, FieldAt, FieldAtMut, FieldMut, FieldRef,
    Octet, Storage, Tag,
};
