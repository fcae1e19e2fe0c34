//! Tolerant numeric parsing for device tokens.
//!
//! Exports mix `.` and `,` decimal separators and sometimes carry stray
//! quotes or unit suffixes. `None` means "field absent".

/// Strip surrounding whitespace and double quotes.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// Parse a decimal, accepting a comma as the decimal separator.
///
/// Only the leading numeric prefix is read, so `80.2kg` yields `80.2`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = strip_quotes(raw).replacen(',', ".", 1);
    let prefix = &cleaned[..numeric_prefix_len(&cleaned)];
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the longest `[+-]digits[.digits][e[+-]digits]` prefix.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    // A lone sign or dot is not a number.
    if mantissa_end - end == 0 || (int_end == end && mantissa_end == int_end + 1) {
        return 0;
    }
    end = mantissa_end;

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Parse an integer, discarding every character that is not a digit.
///
/// A minus sign is kept only in leading position.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let mut digits = String::with_capacity(raw.len());
    for c in strip_quotes(raw).chars() {
        if c.is_ascii_digit() || (c == '-' && digits.is_empty()) {
            digits.push(c);
        }
    }
    digits.parse::<i64>().ok()
}
