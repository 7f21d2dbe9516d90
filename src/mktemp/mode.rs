//! Octal permission parsing for `--mode`.

use anyhow::{anyhow, Result};

/// Permissions applied when no mode is given.
pub const DEFAULT_MODE: u32 = 0o600;
/// Largest accepted mode: permission, setuid, setgid and sticky bits.
pub const MAX_MODE: u32 = 0o7777;

/// Whitespace as C `isspace` sees it in the "C" locale.
fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Parse an octal mode the way `strtol(s, NULL, 8)` reads it.
///
/// Leading whitespace and a sign are allowed. Anything after the digits,
/// a missing digit run, a negative value or a value above [`MAX_MODE`] is
/// rejected.
pub fn parse_mode(input: &str) -> Result<u32> {
    let invalid = || anyhow!("Invalid mode `{}'.  Mode must be octal.", input);

    let rest = input.trim_start_matches(is_c_space);
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    if digits.is_empty() || !digits.bytes().all(|b| matches!(b, b'0'..=b'7')) {
        return Err(invalid());
    }

    let value = u32::from_str_radix(digits, 8).map_err(|_| invalid())?;
    if value > MAX_MODE || (negative && value != 0) {
        return Err(invalid());
    }
    Ok(value)
}
