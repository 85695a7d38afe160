use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use log::{debug, warn};
use ordbits::layout::{place_field, unit_mask};

/// Prints where each field of an ad-hoc field list lands.
#[derive(Parser)]
#[command(name = "ordbits-inspect")]
struct Args {
    /// Storage unit: `u8` through `u128`, `i8` through `i128`, `octet`, or a
    /// bit count.
    #[arg(long, default_value = "u8")]
    unit: Unit,

    /// Reject fields wider than the unit instead of truncating them.
    #[arg(long)]
    strict: bool,

    /// Fields in declaration order, as `name:width`, `name:width=default`, or
    /// `name:width=value!` for a fixed field. `_:width` is padding.
    #[arg(required = true)]
    fields: Vec<FieldArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Unit {
    bits: u32,
    signed: bool,
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (signed, digits) = match s {
            "octet" => return Ok(Unit { bits: 8, signed: false }),
            _ if s.starts_with('u') => (false, &s[1..]),
            _ if s.starts_with('i') => (true, &s[1..]),
            _ => (false, s),
        };
        let bits: u32 = digits
            .parse()
            .with_context(|| format!("invalid unit type `{s}`"))?;
        ensure!(
            (1..=128).contains(&bits),
            "unit width must be between 1 and 128 bits, not {bits}"
        );
        if digits.len() != s.len() {
            ensure!(
                matches!(bits, 8 | 16 | 32 | 64 | 128),
                "`{s}` is not a primitive integer type"
            );
        }
        Ok(Unit { bits, signed })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct FieldArg {
    /// `None` for padding.
    name: Option<String>,
    width: u32,
    default: i128,
    fixed: bool,
}

impl FromStr for FieldArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected `name:width`, found `{s}`"))?;
        let (width, default) = match rest.split_once('=') {
            Some((width, default)) => (width, Some(default)),
            None => (rest, None),
        };
        let width: u32 = width
            .parse()
            .with_context(|| format!("invalid width for `{name}`"))?;

        let (default, fixed) = match default {
            Some(default) => {
                let (value, fixed) = match default.strip_suffix('!') {
                    Some(value) => (value, true),
                    None => (default, false),
                };
                let value =
                    parse_int(value).with_context(|| format!("invalid default for `{name}`"))?;
                (value, fixed)
            }
            None => (0, false),
        };

        if name == "_" {
            ensure!(default == 0 && !fixed, "padding cannot have a default value");
            return Ok(FieldArg {
                name: None,
                width,
                default: 0,
                fixed: true,
            });
        }
        ensure!(
            !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'),
            "invalid field name `{name}`"
        );
        ensure!(
            width > 0,
            "named fields must have a nonzero width; use `_:0` for a unit break"
        );
        Ok(FieldArg {
            name: Some(name.to_string()),
            width,
            default,
            fixed,
        })
    }
}

/// Parses a decimal, `0x`, or `0b` integer with an optional minus sign.
fn parse_int(s: &str) -> Result<i128> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i128::from_str_radix(&hex.replace('_', ""), 16)?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i128::from_str_radix(&bin.replace('_', ""), 2)?
    } else {
        digits.replace('_', "").parse()?
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// One placed field.
#[derive(Debug, PartialEq, Eq)]
struct Row {
    begin: u32,
    unit_index: usize,
    shift: u32,
    masked_width: u32,
    mask: u128,
    default_bits: u128,
}

#[derive(Debug)]
struct Report {
    rows: Vec<Row>,
    total_bits: u32,
    data_size: usize,
    storage: Vec<u128>,
}

fn compute(unit: Unit, strict: bool, fields: &[FieldArg]) -> Result<Report> {
    let mut names = HashSet::new();
    let mut rows = Vec::with_capacity(fields.len());
    let mut cursor: u32 = 0;
    for field in fields {
        let label = field.name.as_deref().unwrap_or("_");
        if let Some(name) = &field.name {
            ensure!(names.insert(name.as_str()), "duplicate field name `{name}`");
        }
        ensure!(
            u64::from(cursor) + u64::from(field.width) + u64::from(unit.bits)
                <= u64::from(u32::MAX),
            "the layout is too large to place field `{label}`"
        );
        if field.width > unit.bits {
            ensure!(
                !strict,
                "field `{label}` is {} bits wide but a unit holds {}",
                field.width,
                unit.bits
            );
            warn!(
                "field `{label}` is wider than its unit; only {} of its {} bits are kept",
                unit.bits, field.width
            );
        }

        let placement = place_field(cursor, field.width, unit.bits);
        debug!("{:?} at cursor {cursor}: {placement:?}", field.name);
        cursor = placement.next;

        let shift = placement.begin % unit.bits;
        let masked_width = field.width.min(unit.bits);
        let mask = unit_mask(shift, masked_width);
        rows.push(Row {
            begin: placement.begin,
            unit_index: (placement.begin / unit.bits) as usize,
            shift,
            masked_width,
            mask,
            default_bits: ((field.default as u128) << shift) & mask,
        });
    }

    let data_size = cursor.div_ceil(unit.bits) as usize;
    let mut storage = vec![0; data_size];
    for row in rows.iter().filter(|row| row.masked_width > 0) {
        storage[row.unit_index] |= row.default_bits;
    }
    Ok(Report {
        rows,
        total_bits: cursor,
        data_size,
        storage,
    })
}

fn print_report(unit: Unit, fields: &[FieldArg], report: &Report) {
    let digits = unit.bits.div_ceil(4) as usize;
    println!(
        "{:>3}  {:<16} {:>5} {:>5} {:>4} {:>5}  {:<w$}  {:<w$}  fixed",
        "#",
        "tag",
        "width",
        "begin",
        "unit",
        "shift",
        "mask",
        "default",
        w = digits + 2,
    );
    for (i, (field, row)) in fields.iter().zip(&report.rows).enumerate() {
        println!(
            "{i:>3}  {:<16} {:>5} {:>5} {:>4} {:>5}  {:#0w$x}  {:#0w$x}  {}",
            field.name.as_deref().unwrap_or("_"),
            field.width,
            row.begin,
            row.unit_index,
            row.shift,
            row.mask,
            row.default_bits >> row.shift,
            if field.fixed { "yes" } else { "" },
            w = digits + 2,
        );
    }
    println!();
    println!(
        "{} bits in {} {}-bit {} units",
        report.total_bits,
        report.data_size,
        unit.bits,
        if unit.signed { "signed" } else { "unsigned" },
    );
    let storage: Vec<_> = report
        .storage
        .iter()
        .map(|unit| format!("{unit:#0w$x}", w = digits + 2))
        .collect();
    println!("initial storage: [{}]", storage.join(", "));
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let report = compute(args.unit, args.strict, &args.fields)?;
    print_report(args.unit, &args.fields, &report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(specs: &[&str]) -> Vec<FieldArg> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn parses_units() {
        assert_eq!("u16".parse::<Unit>().unwrap(), Unit { bits: 16, signed: false });
        assert_eq!("i64".parse::<Unit>().unwrap(), Unit { bits: 64, signed: true });
        assert_eq!("octet".parse::<Unit>().unwrap(), Unit { bits: 8, signed: false });
        assert_eq!("12".parse::<Unit>().unwrap(), Unit { bits: 12, signed: false });
        assert!("u12".parse::<Unit>().is_err());
        assert!("0".parse::<Unit>().is_err());
        assert!("f32".parse::<Unit>().is_err());
    }

    #[test]
    fn parses_fields() {
        let field: FieldArg = "mode:3".parse().unwrap();
        assert_eq!(field.name.as_deref(), Some("mode"));
        assert_eq!((field.width, field.default, field.fixed), (3, 0, false));

        let field: FieldArg = "level:6=-3".parse().unwrap();
        assert_eq!((field.width, field.default, field.fixed), (6, -3, false));

        let field: FieldArg = "rev:4=0b1_01!".parse().unwrap();
        assert_eq!((field.default, field.fixed), (5, true));

        let field: FieldArg = "_:0".parse().unwrap();
        assert_eq!(field.name, None);
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!("mode".parse::<FieldArg>().is_err());
        assert!("mode:x".parse::<FieldArg>().is_err());
        assert!("mode:0".parse::<FieldArg>().is_err());
        assert!("_:2=1".parse::<FieldArg>().is_err());
        assert!("a-b:2".parse::<FieldArg>().is_err());
    }

    #[test]
    fn computes_placement_and_initial_storage() {
        let unit = "u8".parse().unwrap();
        let report = compute(unit, false, &fields(&["a:3=2", "b:1", "c:5=10"])).unwrap();
        assert_eq!(report.total_bits, 13);
        assert_eq!(report.data_size, 2);
        assert_eq!(report.rows[2].begin, 8);
        assert_eq!(report.rows[2].mask, 0b1_1111);
        assert_eq!(report.storage, vec![0b010, 0b1010]);
    }

    #[test]
    fn breaks_and_duplicates() {
        let unit = "u8".parse().unwrap();
        let report = compute(unit, false, &fields(&["a:3", "_:0", "b:1=1"])).unwrap();
        assert_eq!(report.storage, vec![0, 1]);

        let err = compute(unit, false, &fields(&["a:3", "a:1"])).unwrap_err();
        assert_eq!(err.to_string(), "duplicate field name `a`");
    }

    #[test]
    fn strict_mode_rejects_oversized_fields() {
        let unit = "u8".parse().unwrap();
        let oversized = fields(&["a:1", "b:12=-1"]);
        assert!(compute(unit, true, &oversized).is_err());

        let report = compute(unit, false, &oversized).unwrap();
        assert_eq!(report.rows[1].begin, 8);
        assert_eq!(report.rows[1].mask, 0xff);
        assert_eq!(report.storage, vec![0, 0xff, 0]);
    }

    #[test]
    fn rejects_layouts_past_the_bit_range() {
        let unit = "u8".parse().unwrap();
        let err = compute(unit, false, &fields(&["a:4294967295", "b:2"])).unwrap_err();
        assert_eq!(err.to_string(), "the layout is too large to place field `a`");

        let err = compute(unit, false, &fields(&["a:4294967000", "b:300"])).unwrap_err();
        assert_eq!(err.to_string(), "the layout is too large to place field `b`");
    }
}
