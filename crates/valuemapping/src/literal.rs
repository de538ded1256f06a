//! DSP0004 integer literals as they appear in `ValueMap` entries.

use cim_obj::CimError;

fn digits_value(digits: &str, radix: u32, literal: &str) -> Result<i128, CimError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(CimError::Parse(format!("invalid integer literal {literal:?}")));
    }
    i128::from_str_radix(digits, radix)
        .map_err(|err| CimError::Parse(format!("integer literal {literal:?}: {err}")))
}

/// Parse a decimal, `0x` hexadecimal, leading-zero octal or `b`-suffixed
/// binary literal with an optional sign.
pub fn parse_integer(literal: &str) -> Result<i128, CimError> {
    let text = literal.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        digits_value(hex, 16, literal)?
    } else if let Some(bin) = body.strip_suffix('b').or_else(|| body.strip_suffix('B')) {
        digits_value(bin, 2, literal)?
    } else if body.len() > 1 && body.starts_with('0') {
        digits_value(&body[1..], 8, literal)?
    } else {
        digits_value(body, 10, literal)?
    };
    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_forms() {
        assert_eq!(parse_integer("0").unwrap(), 0);
        assert_eq!(parse_integer("42").unwrap(), 42);
        assert_eq!(parse_integer("-42").unwrap(), -42);
        assert_eq!(parse_integer("+7").unwrap(), 7);
        assert_eq!(parse_integer("0x8000").unwrap(), 0x8000);
        assert_eq!(parse_integer("0XfF").unwrap(), 255);
        assert_eq!(parse_integer("017").unwrap(), 15);
        assert_eq!(parse_integer("101b").unwrap(), 5);
        assert_eq!(parse_integer("-11B").unwrap(), -3);
        assert_eq!(parse_integer(" 12 ").unwrap(), 12);
    }

    #[test]
    fn malformed_literals() {
        for bad in ["", "-", "0x", "08", "12b", "1.5", "abc", "0x1g", "1 2"] {
            assert!(
                matches!(parse_integer(bad), Err(CimError::Parse(_))),
                "{bad:?} should fail"
            );
        }
    }
}
