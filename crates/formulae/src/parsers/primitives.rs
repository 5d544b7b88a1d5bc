use nom::{
    branch::alt,
    character::complete::{char, satisfy, u32},
    combinator::{cut, map, map_opt, not, value},
    sequence::{preceded, terminated},
};

use crate::{Count, OffsetKind};

use super::errors::{FormulaErrorKind, ParseResult, expect};

/// uppercase
///   = "A" | "B" | "C" | "D" | "E" | "F" | "G"
///   | "H" | "I" | "J" | "K" | "L" | "M" | "N"
///   | "O" | "P" | "Q" | "R" | "S" | "T" | "U"
///   | "V" | "W" | "X" | "Y" | "Z"
///   ;
pub fn uppercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_uppercase());
    expect(parser, FormulaErrorKind::ExpectedUppercase)(i)
}

/// lowercase
///   = "a" | "b" | "c" | "d" | "e" | "f" | "g"
///   | "h" | "i" | "j" | "k" | "l" | "m" | "n"
///   | "o" | "p" | "q" | "r" | "s" | "t" | "u"
///   | "v" | "w" | "x" | "y" | "z"
///   ;
pub fn lowercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_lowercase());
    expect(parser, FormulaErrorKind::ExpectedLowercase)(i)
}

/// Count = digit - "0" , { digit } ;
pub fn count(i: &str) -> ParseResult<Count> {
    let not_zero = expect(cut(not(char('0'))), FormulaErrorKind::ExpectedNoLeadingZero);
    let digits = expect(u32, FormulaErrorKind::ExpectedDigit);
    map_opt(preceded(not_zero, digits), Count::new)(i)
}

/// Term Count = "0" | Count ;
pub fn term_count(i: &str) -> ParseResult<u32> {
    let digit = satisfy(|c| c.is_ascii_digit());
    let zero = value(0, terminated(char('0'), not(digit)));
    alt((zero, map(count, Count::get)))(i)
}

/// Offset Kind = "+" | "-" ;
pub fn offset_kind(i: &str) -> ParseResult<OffsetKind> {
    alt((
        value(OffsetKind::Add, char('+')),
        value(OffsetKind::Remove, char('-')),
    ))(i)
}

#[cfg(test)]
mod tests {
    use nom::Err;

    use super::*;

    fn n(count: u32) -> Count {
        Count::new(count).unwrap()
    }

    #[test]
    fn letters() {
        let (upper, lower): (Vec<_>, Vec<_>) =
            ('A'..='Z').map(|c| (c, c.to_ascii_lowercase())).unzip();
        for (u, l) in upper.into_iter().zip(lower) {
            assert_eq!(uppercase(&format!("{u}{l}")), Ok((&*l.to_string(), u)));
            assert_eq!(lowercase(&format!("{l}{u}")), Ok((&*u.to_string(), l)));
            assert!(uppercase(&l.to_string()).is_err());
            assert!(lowercase(&u.to_string()).is_err());
        }
        for other in ["", "1", "[", "+", "\u{3b1}", "\u{391}"] {
            assert!(uppercase(other).is_err(), "{other:?}");
            assert!(lowercase(other).is_err(), "{other:?}");
        }
    }

    #[test]
    fn counts() {
        assert_eq!(count("2"), Ok(("", n(2))));
        assert_eq!(count("12O6"), Ok(("O6", n(12))));
        assert_eq!(count("100]"), Ok(("]", n(100))));
        assert_eq!(count("4294967295"), Ok(("", n(u32::MAX))));
        // Leading zeroes can't be backtracked out of
        for zeroed in ["0", "07", "0H"] {
            assert!(matches!(count(zeroed), Err(Err::Failure(_))), "{zeroed:?}");
        }
        // But a missing count is a recoverable error
        for missing in ["", "H2", "-2", "(2)"] {
            assert!(matches!(count(missing), Err(Err::Error(_))), "{missing:?}");
        }
        // Counts that overflow a u32 are rejected
        assert!(count("4294967296").is_err());
    }

    #[test]
    fn term_counts() {
        assert_eq!(term_count("0"), Ok(("", 0)));
        assert_eq!(term_count("0H"), Ok(("H", 0)));
        assert_eq!(term_count("12O6"), Ok(("O6", 12)));
        // A lone zero is fine, but leading zeroes still aren't
        for zeroed in ["00", "07"] {
            assert!(matches!(term_count(zeroed), Err(Err::Failure(_))), "{zeroed:?}");
        }
        assert!(matches!(term_count("H"), Err(Err::Error(_))));
    }

    #[test]
    fn offset_kinds() {
        assert_eq!(offset_kind("+Na"), Ok(("Na", OffsetKind::Add)));
        assert_eq!(offset_kind("-H2O"), Ok(("H2O", OffsetKind::Remove)));
        assert_eq!(offset_kind("+2"), Ok(("2", OffsetKind::Add)));
        for invalid in ["", "2+", "M", "\u{2212}"] {
            assert!(offset_kind(invalid).is_err(), "{invalid:?}");
        }
    }
}
