#![cfg(feature = "str-tags")]

use ordbits::prelude::*;
use ordbits::{FieldDesc, Layout};
use quickcheck_macros::quickcheck;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

type Widths = (u8, u8, u8, u8);

/// Builds a layout over `u16` from arbitrary widths. Zero widths become unit
/// breaks.
fn layout((a, b, c, d): Widths) -> Layout<&'static str, u16, 4> {
    let mut descs = [FieldDesc::padding(0); 4];
    for (i, width) in [a, b, c, d].into_iter().enumerate() {
        let width = u32::from(width) % 17;
        if width > 0 {
            descs[i] = FieldDesc::new(NAMES[i], width);
        }
    }
    Layout::new(&descs)
}

fn named(layout: &Layout<&'static str, u16, 4>) -> Vec<usize> {
    (0..4).filter(|&i| layout.width(i) > 0).collect()
}

#[quickcheck]
fn fields_never_straddle_units(widths: Widths) -> bool {
    let layout = layout(widths);
    named(&layout).into_iter().all(|i| {
        let begin = layout.begin_bit(i);
        let end = begin + layout.width(i) - 1;
        begin / 16 == end / 16 && layout.unit_index(i) == (begin / 16) as usize
    })
}

#[quickcheck]
fn fields_keep_declaration_order(widths: Widths) -> bool {
    let layout = layout(widths);
    (0..4).all(|i| {
        let next = if i + 1 < 4 {
            layout.begin_bit(i + 1)
        } else {
            layout.total_bits()
        };
        layout.begin_bit(i) + layout.width(i) <= next
    })
}

#[quickcheck]
fn masks_are_disjoint_within_a_unit(widths: Widths) -> bool {
    let layout = layout(widths);
    named(&layout).into_iter().all(|i| {
        named(&layout).into_iter().all(|j| {
            i == j
                || layout.unit_index(i) != layout.unit_index(j)
                || layout.mask(i) & layout.mask(j) == 0
        })
    })
}

#[quickcheck]
fn data_size_covers_every_bit(widths: Widths) -> bool {
    let layout = layout(widths);
    let total = layout.total_bits() as usize;
    layout.data_size() == total.div_ceil(16)
        && named(&layout).into_iter().all(|i| layout.unit_index(i) < layout.data_size())
}

#[quickcheck]
fn writes_read_back_and_leave_neighbors_alone(
    widths: Widths,
    values: (u16, u16, u16, u16),
) -> bool {
    let layout = layout(widths);
    let values = [values.0, values.1, values.2, values.3];
    let mut units = [0u16; 4];
    let units = &mut units[..layout.data_size()];

    for i in named(&layout) {
        let Ok(mut field) = layout.field_mut(units, i) else {
            return false;
        };
        field.set(values[i]);
    }
    let units = &*units;

    named(&layout).into_iter().all(|i| {
        let expected = values[i] & (u16::MAX >> (16 - layout.width(i)));
        layout.field(units, i).is_ok_and(|field| {
            let first = field.get();
            first == expected && field.get() == first
        })
    })
}

#[quickcheck]
fn skipped_bits_stay_clear(widths: Widths) -> bool {
    let layout = layout(widths);
    let mut units = [0u16; 4];
    let units = &mut units[..layout.data_size()];
    for i in named(&layout) {
        if let Ok(mut field) = layout.field_mut(units, i) {
            field.set(u16::MAX);
        }
    }

    let mut covered = [0u16; 4];
    for i in named(&layout) {
        covered[layout.unit_index(i)] |= layout.mask(i);
    }
    units.iter().zip(covered).all(|(unit, mask)| *unit == mask)
}

bitfield! {
    struct Signed: i32 { low: 7, mid: 13, high: 12 }
}

#[quickcheck]
fn signed_reads_sign_extend(low: i32, mid: i32, high: i32) -> bool {
    let value = Signed::new().with_low(low).with_mid(mid).with_high(high);
    let extend = |v: i32, width: u32| (v << (32 - width)) >> (32 - width);
    value.low().get() == extend(low, 7)
        && value.mid().get() == extend(mid, 13)
        && value.high().get() == extend(high, 12)
}
