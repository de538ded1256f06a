//! MOF string literals and line wrapping.
//!
//! Widths are counted in characters. `line_pos` is the column at which the
//! generated text starts; each function returns the column after it.
//! `end_space` reserves room after the last piece on its line for trailing
//! punctuation such as `;` or ` )`.

/// Indentation string of `n` spaces.
pub(crate) fn indent_str(n: usize) -> String {
    " ".repeat(n)
}

/// Escaped form of one character inside a MOF literal quoted with `quote`.
fn escape_char(c: char, quote: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\u{8}' => "\\b".to_string(),
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        '\u{c}' => "\\f".to_string(),
        '\r' => "\\r".to_string(),
        c if c == quote => format!("\\{c}"),
        c if c.is_control() && (c as u32) < 0x80 => format!("\\x{:04X}", c as u32),
        c => c.to_string(),
    }
}

fn width(units: &[String]) -> usize {
    units.iter().map(|u| u.chars().count()).sum()
}

/// Number of leading units whose total width stays within `limit`.
fn units_within(units: &[String], limit: usize) -> usize {
    let mut used = 0;
    units
        .iter()
        .take_while(|unit| {
            used += unit.chars().count();
            used <= limit
        })
        .count()
}

/// Render `value` as one or more quoted MOF string literals.
///
/// The literal is split where it would pass `maxline`: after the last space
/// that still fits, or mid-word when no space fits on a fresh line. Each
/// part is quoted on its own and continued on a new line indented by
/// `indent`. Escape sequences are never split. With `avoid_splits`, a value
/// that fits on a fresh line is moved there instead of being split.
pub fn mofstr(
    value: &str,
    indent: usize,
    maxline: usize,
    line_pos: usize,
    end_space: usize,
    avoid_splits: bool,
    quote: char,
) -> (String, usize) {
    let units: Vec<String> = value.chars().map(|c| escape_char(c, quote)).collect();
    let mut rest: &[String] = &units;
    let mut out = String::new();
    let mut pos = line_pos;
    let new_line = format!("\n{}", indent_str(indent));

    loop {
        let rest_width = width(rest);
        let room = maxline.saturating_sub(pos);
        if rest_width + 2 + end_space <= room {
            out.push(quote);
            out.extend(rest.iter().map(String::as_str));
            out.push(quote);
            return (out, pos + rest_width + 2);
        }

        let fresh_room = maxline.saturating_sub(indent);
        if avoid_splits && pos > indent && rest_width + 2 + end_space <= fresh_room {
            out.push_str(&new_line);
            pos = indent;
            continue;
        }

        let avail = room.saturating_sub(2);
        let mut used = 0;
        let mut split_after_space = None;
        let mut fit = 0;
        for (i, unit) in rest.iter().enumerate() {
            used += unit.chars().count();
            if used > avail {
                break;
            }
            fit = i + 1;
            if unit == " " {
                split_after_space = Some(i + 1);
            }
        }

        let mut split = match split_after_space {
            Some(n) => n,
            None if pos > indent => {
                out.push_str(&new_line);
                pos = indent;
                continue;
            }
            None => fit.max(1),
        };
        if split >= rest.len() {
            if pos > indent {
                out.push_str(&new_line);
                pos = indent;
                continue;
            }
            // The rest fits only without end_space: break before its last word.
            let last = rest.len().saturating_sub(1);
            split = rest[..last]
                .iter()
                .rposition(|unit| unit == " ")
                .map(|i| i + 1)
                .unwrap_or_else(|| units_within(rest, avail.saturating_sub(end_space)));
            if split == 0 || split >= rest.len() {
                out.push(quote);
                out.extend(rest.iter().map(String::as_str));
                out.push(quote);
                return (out, pos + rest_width + 2);
            }
        }
        let (part, tail) = rest.split_at(split);
        out.push(quote);
        out.extend(part.iter().map(String::as_str));
        out.push(quote);
        out.push_str(&new_line);
        pos = indent;
        rest = tail;
    }
}

/// Place an unquoted value on the current line if it fits, otherwise on a
/// new line indented by `indent`.
pub fn mofval(value: &str, indent: usize, maxline: usize, line_pos: usize, end_space: usize) -> (String, usize) {
    let len = value.chars().count();
    if line_pos <= indent || line_pos + len + end_space <= maxline {
        (value.to_string(), line_pos + len)
    } else {
        (format!("\n{}{value}", indent_str(indent)), indent + len)
    }
}
