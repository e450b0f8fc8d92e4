//! Hex offset parsing and hexdump formatting utilities.

use anyhow::Result;

/// Parse a hex offset string (with or without 0x prefix).
pub fn parse_hex_offset(s: &str) -> Result<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| anyhow::anyhow!("Invalid hex offset {:?}: {}", s, e))
}

/// Format one hexdump row of up to 16 bytes.
///
/// ```text
/// 0x001A2B0: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
/// ```
pub fn format_hex_row(address: u64, chunk: &[u8], ascii: bool) -> String {
    let mut row = format!("0x{:07X}: ", address);

    for j in 0..16 {
        if j == 8 {
            row.push(' ');
        }
        match chunk.get(j) {
            Some(byte) => row.push_str(&format!("{:02X} ", byte)),
            None => row.push_str("   "),
        }
    }

    if ascii {
        row.push_str(" |");
        for byte in chunk {
            if (0x20..0x7F).contains(byte) {
                row.push(*byte as char);
            } else {
                row.push('.');
            }
        }
        for _ in chunk.len()..16 {
            row.push(' ');
        }
        row.push('|');
    }

    row
}
