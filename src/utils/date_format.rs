//! Joda-style date patterns
//!
//! Output dates are configured with Joda/Java patterns such as
//! `YYYY-MM-dd HH:mm:ss`; this module translates them to chrono's
//! strftime syntax.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::errors::{ZonalError, ZonalResult};

/// Translates a Joda date pattern to a chrono format string
///
/// Letters repeat to select the width (`M` month, `MM` zero padded,
/// `MMM` short name, `MMMM` full name). Text between single quotes is
/// copied literally and `''` is a single quote.
pub fn joda_to_chrono(pattern: &str) -> ZonalResult<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let end = chars[i + 1..].iter().position(|&q| q == '\'').ok_or_else(|| {
                ZonalError::ConfigError(format!("Unterminated quote in date format '{}'", pattern))
            })?;
            for &literal in &chars[i + 1..i + 1 + end] {
                push_literal(&mut out, literal);
            }
            i += end + 2;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        out.push_str(field(c, run).ok_or_else(|| {
            ZonalError::ConfigError(format!(
                "Unsupported field '{}' in date format '{}'", c.to_string().repeat(run), pattern
            ))
        })?);
        i += run;
    }

    if StrftimeItems::new(&out).any(|item| matches!(item, Item::Error)) {
        return Err(ZonalError::ConfigError(format!("Invalid date format '{}'", pattern)));
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn field(letter: char, run: usize) -> Option<&'static str> {
    let spec = match (letter, run) {
        ('y' | 'Y', 2) => "%y",
        ('y' | 'Y', _) => "%Y",
        ('x', 2) => "%g",
        ('x', _) => "%G",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('D', 3) => "%j",
        ('D', _) => "%-j",
        ('w', 1) => "%-V",
        ('w', 2) => "%V",
        ('e', _) => "%u",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('a', 1) => "%p",
        ('Z', 1) => "%z",
        ('Z', 2) => "%:z",
        ('z', _) => "%Z",
        _ => return None,
    };
    Some(spec)
}

/// Formats a UTC time with a chrono format string
pub fn format_datetime(date: &DateTime<Utc>, chrono_format: &str) -> ZonalResult<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(chrono_format))
        .map_err(|_| ZonalError::GenericError(format!("Cannot format {} with '{}'", date, chrono_format)))?;
    Ok(out)
}
