#![cfg(feature = "str-tags")]

use ordbits::prelude::*;
use ordbits::{FieldDesc, FieldError, Layout};

bitfield! {
    struct Registers: u8 {
        mode: 3 = 1,
        _: 5,
        const version: 4 = 9,
        count: 4,
    }
}

/// Adds `amount` to every named field, wrapping within each field.
fn bump_all<B: Bitfield>(value: &mut B, tags: &[B::Tag], amount: B::Unit) -> usize
where
    B::Unit: Arithmetic,
{
    let mut bumped = 0;
    for &tag in tags {
        if let Ok(mut field) = value.find_mut(tag) {
            field += amount;
            bumped += 1;
        }
    }
    bumped
}

#[test]
fn generic_code_reaches_fields_by_tag() {
    let mut value = Registers::new();
    let bumped = bump_all(&mut value, &["mode", "version", "count", "missing"], 3);
    assert_eq!(bumped, 2);
    assert_eq!(value.mode().get(), 4);
    assert_eq!(value.version().get(), 9);
    assert_eq!(value.count().get(), 3);
    assert_eq!(value.units(), &[0b0000_0100, 0b0011_1001]);
}

#[test]
fn find_reports_each_failure() {
    let mut value = Registers::new();
    assert_eq!(value.find("version").map(|f| f.get()), Ok(9));
    assert_eq!(value.find("missing").unwrap_err(), FieldError::NotFound);
    assert_eq!(value.find("").unwrap_err(), FieldError::NotFound);
    assert_eq!(
        value.find_mut("version").unwrap_err(),
        FieldError::Fixed { index: 2 },
    );
}

#[test]
fn layouts_bind_views_by_index() {
    let layout = &Registers::LAYOUT;
    let mut units = Registers::new().into_data();

    assert_eq!(layout.field(&units, 3).map(|f| f.get()), Ok(0));
    assert_eq!(
        layout.field(&units, 4).unwrap_err(),
        FieldError::OutOfRange {
            index: 4,
            fields: 4
        },
    );
    assert_eq!(
        layout.field(&units[..1], 3).unwrap_err(),
        FieldError::ShortStorage { needed: 2, len: 1 },
    );

    layout.field_mut(&mut units, 0).unwrap().set(6);
    assert_eq!(Registers::from_data(units).mode().get(), 6);
}

#[test]
fn zero_width_fields_have_no_view() {
    const BROKEN: Layout<&str, u16, 3> = Layout::new(&[
        FieldDesc::new("a", 3),
        FieldDesc::padding(0),
        FieldDesc::new("b", 3),
    ]);
    let units = [0u16; BROKEN.data_size()];
    assert_eq!(
        BROKEN.field(&units, 1).unwrap_err(),
        FieldError::ZeroWidth { index: 1 },
    );
    assert_eq!(BROKEN.position("b"), Some(2));
}

#[test]
fn errors_display_their_cause() {
    assert_eq!(
        FieldError::NotFound.to_string(),
        "no field has the requested tag",
    );
    assert_eq!(
        FieldError::OutOfRange {
            index: 7,
            fields: 3
        }
        .to_string(),
        "field index 7 is out of range for 3 fields",
    );
    assert_eq!(
        FieldError::ZeroWidth { index: 2 }.to_string(),
        "field 2 has zero width and no storage",
    );
    assert_eq!(
        FieldError::Fixed { index: 1 }.to_string(),
        "field 1 is fixed and cannot be written",
    );
    assert_eq!(
        FieldError::ShortStorage { needed: 4, len: 2 }.to_string(),
        "storage has 2 units but the layout needs 4",
    );
}

#[test]
fn layout_debug_lists_rows() {
    let text = format!("{:?}", Registers::LAYOUT);
    assert!(text.contains("\"mode\""), "{text}");
    assert!(text.contains("\"version\""), "{text}");
}
