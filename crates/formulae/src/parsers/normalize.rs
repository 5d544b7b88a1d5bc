use std::{borrow::Cow, iter};

use itertools::Itertools;

/// Rewrites typeset formulas into the plain ASCII notation understood by the formula parser
///
/// Subscript digits become counts (`H₂O` to `H2O`), superscript digits in front of an element become an isotope tag
/// (`¹³CH₄` to `[13]CH4`), and a trailing superscript charge becomes a charge suffix (`SO₄²⁻` to `SO4-2`). Superscript
/// digits anywhere else are read as plain digits. Any other text is passed through untouched, so that the parser can
/// point out what's wrong with it.
#[must_use]
pub fn normalize(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(digit) = subscript_digit(c) {
            normalized.push(digit);
        } else if let Some(digit) = superscript_digit(c) {
            let rest = chars
                .peeking_take_while(|&c| superscript_digit(c).is_some())
                .filter_map(superscript_digit);
            let digits: String = iter::once(digit).chain(rest).collect();
            match chars.peek().copied() {
                Some(next) if next.is_ascii_uppercase() => {
                    normalized.push('[');
                    normalized.push_str(&digits);
                    normalized.push(']');
                }
                Some(next) if superscript_sign(next).is_some() => {
                    chars.next();
                    normalized.extend(superscript_sign(next));
                    normalized.push_str(&digits);
                }
                _ => normalized.push_str(&digits),
            }
        } else if let Some(sign) = superscript_sign(c) {
            normalized.push(sign);
        } else {
            normalized.push(c);
        }
    }
    Cow::Owned(normalized)
}

fn subscript_digit(c: char) -> Option<char> {
    match c {
        '\u{2080}'..='\u{2089}' => char::from_digit(u32::from(c) - 0x2080, 10),
        _ => None,
    }
}

fn superscript_digit(c: char) -> Option<char> {
    match c {
        '\u{2070}' => Some('0'),
        '\u{00B9}' => Some('1'),
        '\u{00B2}' => Some('2'),
        '\u{00B3}' => Some('3'),
        '\u{2074}'..='\u{2079}' => char::from_digit(u32::from(c) - 0x2070, 10),
        _ => None,
    }
}

const fn superscript_sign(c: char) -> Option<char> {
    match c {
        '\u{207A}' => Some('+'),
        '\u{207B}' => Some('-'),
        _ => None,
    }
}
