//! Hex quantity helpers for values read from receipts.

use alloy::primitives::U256;

/// Compare two hex quantities by numeric value.
///
/// The `0x` prefix is optional, case and zero padding are ignored, so
/// `"0x1"`, `"0x01"` and `"1"` are all equal. Anything that is not purely hex
/// digits compares unequal, even to itself.
pub fn compare_hex(a: &str, b: &str) -> bool {
    match (parse_hex_quantity(a), parse_hex_quantity(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn parse_hex_quantity(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Parse a `0x`-prefixed hexadecimal quantity into a `u64`.
pub fn parse_hex_u64(hex: &str) -> Result<u64, String> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| format!("{hex} is missing the 0x prefix"))?;
    u64::from_str_radix(digits, 16).map_err(|e| format!("{hex} is not a u64 quantity: {e}"))
}
