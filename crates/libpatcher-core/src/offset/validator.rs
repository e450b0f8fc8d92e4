//! Offset list grammar: comma separated `0x`-prefixed hex values.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref OFFSET_PATTERN: Regex =
        Regex::new(r"^0x[0-9a-fA-F]+$").expect("offset pattern compiles");
}

/// One list element. Values wider than 64 bits are rejected.
fn parse_one(offset: &str) -> Option<u64> {
    let offset = offset.trim();
    if !OFFSET_PATTERN.is_match(offset) {
        return None;
    }
    u64::from_str_radix(&offset[2..], 16).ok()
}

/// Check an offset list. Empty input is valid and means "no offsets".
pub fn validate_offsets(raw: &str) -> bool {
    raw.is_empty() || raw.split(',').all(|offset| parse_one(offset).is_some())
}

/// Parse an offset list into file offsets, keeping order and duplicates.
///
/// `kind` is only used for the error message.
pub fn parse_offsets(kind: &str, raw: &str) -> Result<Vec<u64>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|offset| {
            parse_one(offset).ok_or_else(|| Error::InvalidOffsetFormat {
                kind: kind.to_string(),
                input: raw.to_string(),
            })
        })
        .collect()
}

/// Format an offset the way it is entered (e.g. "0x1A0")
pub fn format_offset(offset: u64) -> String {
    format!("0x{:X}", offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty() {
        assert!(validate_offsets(""));
    }

    #[test]
    fn test_validate_lists() {
        assert!(validate_offsets("0x10"));
        assert!(validate_offsets("0x10,0x20"));
        assert!(validate_offsets("0x10, 0xAB"));
        assert!(validate_offsets("0xdeadBEEF"));
    }

    #[test]
    fn test_validate_rejects_bad_digits_and_prefix() {
        assert!(!validate_offsets("0x1G"));
        assert!(!validate_offsets("100"));
        assert!(!validate_offsets("0X100"));
        assert!(!validate_offsets("0x"));
        assert!(!validate_offsets("-0x10"));
        assert!(!validate_offsets("+0x10"));
    }

    #[test]
    fn test_validate_is_all_or_nothing() {
        assert!(!validate_offsets("0x10,zz,0x30"));
        assert!(!validate_offsets("0x10,"));
        assert!(!validate_offsets("0x10,,0x20"));
        assert!(!validate_offsets(" "));
    }

    #[test]
    fn test_parse_offsets_keeps_order_and_duplicates() {
        assert_eq!(
            parse_offsets("boolean_true", "0x200, 0x100,0x200").unwrap(),
            vec![0x200, 0x100, 0x200]
        );
        assert!(parse_offsets("boolean_true", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_offsets_invalid() {
        let err = parse_offsets("void_nop", "0x10,100").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOffsetFormat { ref kind, ref input } if kind == "void_nop" && input == "0x10,100"
        ));
    }

    #[test]
    fn test_values_wider_than_64_bits_are_invalid() {
        assert!(!validate_offsets("0x1FFFFFFFFFFFFFFFFF"));
        assert!(!validate_offsets("0x100, 0x10000000000000000"));
        assert!(validate_offsets("0xFFFFFFFFFFFFFFFF"));
        assert!(validate_offsets("0x0000000000000000000001"));
        assert!(matches!(
            parse_offsets("long_64", "0x1FFFFFFFFFFFFFFFFF"),
            Err(Error::InvalidOffsetFormat { .. })
        ));
        assert_eq!(
            parse_offsets("long_64", "0xFFFFFFFFFFFFFFFF").unwrap(),
            vec![u64::MAX]
        );
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0x1A0), "0x1A0");
        assert_eq!(format_offset(0), "0x0");
    }
}
