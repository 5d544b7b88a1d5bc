use std::{fmt, iter};

use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::{all_consuming, complete, consumed},
    error::{ErrorKind, ParseError},
};
use thiserror::Error;

use crate::atoms::errors::AtomicLookupError;

pub type ParseResult<'s, O> = IResult<&'s str, O, LabeledParseError<'s>>;

// NOTE: Public so that callers inspecting a `FormulaError` can tell exactly which part of the grammar was violated
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum FormulaErrorKind {
    #[error(
        "expected a chemical formula, like C2H6O, [13]CH4, or SO4-2 (optionally followed by a charge)"
    )]
    ExpectedFormula,

    #[error(
        "expected an element (like Au) or an isotope (like [15]N) optionally followed by a number"
    )]
    ExpectedTerm,

    #[diagnostic(help(
        "a 0 value doesn't make sense here, if you've mistakenly included a leading zero, like \
        NH02, try just NH2 instead"
    ))]
    #[error("counts cannot start with 0")]
    ExpectedNoLeadingZero,

    #[error("expected an ASCII digit 1-9")]
    ExpectedDigit,

    #[error("expected an element symbol")]
    ExpectedElementSymbol,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[error("expected '[' to open an isotope tag")]
    ExpectedIsotopeStart,

    #[error("expected an isotopic mass number")]
    ExpectedMassNumber,

    #[diagnostic(help("isotope tags only contain the mass number, like [13]C, with the element following the ']'"))]
    #[error("expected ']' to close an isotope tag")]
    ExpectedIsotopeEnd,

    #[diagnostic(help("a parenthesised charge must be closed, like SO4(-2)"))]
    #[error("expected ')' to close the charge")]
    ExpectedChargeEnd,

    #[error("expected an adduct, like [M+H]+, [M-H2O+H]+, or [2M+Na]2+")]
    ExpectedAdduct,

    #[error("expected '[' to open the adduct")]
    ExpectedAdductStart,

    #[diagnostic(help(
        "adducts must name the molecule as M, optionally preceded by a multimer count, like [M+H]+ or [2M+H]+"
    ))]
    #[error("expected 'M' to stand for the molecule")]
    ExpectedMolecule,

    #[error("expected a '+' or '-' followed by an optional count and a chemical formula, like +Na or -2H2O")]
    ExpectedAdductTerm,

    #[diagnostic(help("you've probably forgotten to close the adduct, or mistyped one of its terms"))]
    #[error("expected ']' to close the adduct")]
    ExpectedAdductEnd,

    #[diagnostic(transparent)]
    #[error(transparent)]
    LookupError(Box<AtomicLookupError>),

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, \
        then please report it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help("check the unparsed region for errors, or remove it from the rest of the input"))]
    #[error("could not interpret the full input")]
    Incomplete,
}

impl FormulaErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            // NOTE: Stuck with this nested match until either `box_patterns` or `deref_patterns` are stabilized
            Self::LookupError(e) => match **e {
                AtomicLookupError::Element(..) => "element not found",
                AtomicLookupError::Isotope(..) => "isotope not found",
            },
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedNoLeadingZero => "expected non-zero",
            Self::ExpectedIsotopeStart | Self::ExpectedAdductStart => "expected '['",
            Self::ExpectedMassNumber => "expected a mass number",
            Self::ExpectedIsotopeEnd | Self::ExpectedAdductEnd => "expected ']'",
            Self::ExpectedChargeEnd => "expected ')'",
            Self::ExpectedMolecule => "expected 'M'",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
            _ => return None,
        })
    }
}

impl From<ErrorKind> for FormulaErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}

impl From<AtomicLookupError> for FormulaErrorKind {
    fn from(value: AtomicLookupError) -> Self {
        Self::LookupError(Box::new(value))
    }
}

// Parse-Time Errors ===================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LabeledParseError<'s> {
    input: &'s str,
    length: usize,
    kind: FormulaErrorKind,
    source: Option<Box<LabeledParseError<'s>>>,
}

impl<'s> LabeledParseError<'s> {
    pub(crate) const fn new(input: &'s str, kind: FormulaErrorKind) -> Self {
        Self::spanning(input, 0, kind)
    }

    const fn spanning(input: &'s str, length: usize, kind: FormulaErrorKind) -> Self {
        Self {
            input,
            length,
            kind,
            source: None,
        }
    }

    fn with_source(input: &'s str, kind: FormulaErrorKind, source: Self) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(input, kind)
        }
    }

    // NOTE: Inputs are always suffixes of the full input, so shorter remaining input means deeper into the parse
    fn remaining(&self) -> usize {
        self.source
            .as_ref()
            .map_or(self.input.len(), |source| source.remaining())
    }

    fn into_final_error(self, full_input: &str) -> LabeledError {
        let start = full_input.len().saturating_sub(self.input.len());
        let span = SourceSpan::from(start..start + self.length);
        LabeledError {
            // NOTE: The additional space is added so that labels can point to the end of an input
            full_input: format!("{full_input} "),
            span,
            label: self.kind.label(),
            kind: self.kind,
            source: self
                .source
                .map(|source| Box::new(source.into_final_error(full_input))),
        }
    }
}

impl<'s> ParseError<&'s str> for LabeledParseError<'s> {
    fn from_error_kind(input: &'s str, kind: ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    // NOTE: Of two failed alternatives, report the one that made it furthest through the input
    fn or(self, other: Self) -> Self {
        if other.remaining() < self.remaining() {
            other
        } else {
            self
        }
    }
}

// Final Errors ========================================================================================================

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct LabeledError {
    full_input: String,
    span: SourceSpan,
    label: Option<&'static str>,
    kind: FormulaErrorKind,
    #[source]
    source: Option<Box<LabeledError>>,
}

impl LabeledError {
    /// The text that failed to parse
    #[must_use]
    pub fn input(&self) -> &str {
        self.full_input.trim_end_matches(' ')
    }

    /// The region of the input that this error points to
    #[must_use]
    pub const fn span(&self) -> SourceSpan {
        self.span
    }

    /// The text covered by [`Self::span()`], like an unknown element symbol
    #[must_use]
    pub fn fragment(&self) -> &str {
        let start = self.span.offset();
        self.full_input
            .get(start..start + self.span.len())
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn kind(&self) -> &FormulaErrorKind {
        &self.kind
    }

    pub(crate) fn is_lookup_failure(&self) -> bool {
        matches!(self.kind, FormulaErrorKind::LookupError(_))
            || self
                .source
                .as_ref()
                .is_some_and(|source| source.is_lookup_failure())
    }

    // NOTE: Errors closer to the root carry the most useful messages, but the most precise labels are found deeper
    // in the tree, so labels are hoisted up to the first ancestor that lacks one
    fn bubble_label(&mut self) {
        if self.label.is_none() {
            if let Some(child) = &mut self.source {
                child.bubble_label();
                if let Some(label) = child.label.take() {
                    self.label = Some(label);
                    self.span = child.span;
                }
            }
        }
    }
}

impl Diagnostic for LabeledError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.full_input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = self.label?;
        let labeled_span = LabeledSpan::new_with_span(Some(label.to_owned()), self.span);
        Some(Box::new(iter::once(labeled_span)))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        self.source.as_deref().map(|e| e as &dyn Diagnostic)
    }
}

// Combinators =========================================================================================================

pub fn final_parser<'s, O, P>(parser: P) -> impl FnMut(&'s str) -> Result<O, LabeledError>
where
    P: Parser<&'s str, O, LabeledParseError<'s>>,
{
    let mut parser = all_consuming(complete(parser));
    move |input| {
        parser.parse(input).finish().map(|(_, o)| o).map_err(|e| {
            let mut error = e.into_final_error(input);
            error.bubble_label();
            error
        })
    }
}

/// Like `nom::combinator::map_res`, but any failure of `f` is fatal and is labeled with the full span that `parser`
/// consumed
pub fn map_res<'s, O1, O2, E, P, F>(
    mut parser: P,
    mut f: F,
) -> impl FnMut(&'s str) -> ParseResult<'s, O2>
where
    P: Parser<&'s str, O1, LabeledParseError<'s>>,
    F: FnMut(O1) -> Result<O2, E>,
    E: Into<FormulaErrorKind>,
{
    move |input| {
        let (rest, (matched, output)) = consumed(|i| parser.parse(i))(input)?;
        match f(output) {
            Ok(output) => Ok((rest, output)),
            Err(e) => Err(Err::Failure(LabeledParseError::spanning(
                input,
                matched.len(),
                e.into(),
            ))),
        }
    }
}

pub fn wrap_err<'s, O, P>(
    mut parser: P,
    kind: FormulaErrorKind,
) -> impl FnMut(&'s str) -> ParseResult<'s, O>
where
    P: Parser<&'s str, O, LabeledParseError<'s>>,
{
    move |input| {
        parser
            .parse(input)
            .map_err(|e| e.map(|e| LabeledParseError::with_source(input, kind.clone(), e)))
    }
}

pub fn expect<'s, O, P>(
    mut parser: P,
    kind: FormulaErrorKind,
) -> impl FnMut(&'s str) -> ParseResult<'s, O>
where
    P: Parser<&'s str, O, LabeledParseError<'s>>,
{
    move |input| {
        parser
            .parse(input)
            .map_err(|e| e.map(|_| LabeledParseError::new(input, kind.clone())))
    }
}

#[cfg(test)]
mod tests {
    use nom::{
        branch::alt,
        character::complete::{char, digit1},
        sequence::pair,
    };

    use super::*;

    fn bracketed(i: &str) -> ParseResult<(char, &str)> {
        let open = expect(char('['), FormulaErrorKind::ExpectedIsotopeStart);
        let digits = expect(digit1, FormulaErrorKind::ExpectedDigit);
        wrap_err(pair(open, digits), FormulaErrorKind::ExpectedTerm)(i)
    }

    fn either_bracket(i: &str) -> ParseResult<(char, char)> {
        let digits = pair(char('['), pair(char('1'), char('2')));
        alt((pair(char('['), char('x')), digits.map(|(b, (d, _))| (b, d))))(i)
    }

    #[test]
    fn alternatives_report_the_furthest_error() {
        let Err::Error(error) = either_bracket("[13").unwrap_err() else {
            panic!("expected a recoverable error");
        };
        assert_eq!(error.input, "3");
        assert_eq!(error.remaining(), 1);
    }

    #[test]
    fn labels_bubble_to_the_root() {
        let error = final_parser(bracketed)("[x").unwrap_err();
        assert_eq!(error.kind(), &FormulaErrorKind::ExpectedTerm);
        assert_eq!(error.labels().unwrap().count(), 1);
        assert_eq!(error.span(), SourceSpan::from(1..1));
        assert_eq!(error.input(), "[x");
        let cause = error.diagnostic_source().unwrap();
        assert_eq!(cause.to_string(), "expected an ASCII digit 1-9");
        assert!(cause.labels().is_none());
    }

    #[test]
    fn incomplete_input() {
        let error = final_parser(bracketed)("[12]").unwrap_err();
        assert_eq!(error.kind(), &FormulaErrorKind::Incomplete);
        assert_eq!(error.span(), SourceSpan::from(3..3));
        assert_eq!(error.to_string(), "could not interpret the full input");
    }

    #[test]
    fn map_res_spans_the_consumed_input() {
        let lookup = |symbol: &str| -> Result<(), AtomicLookupError> {
            Err(AtomicLookupError::Element(symbol.to_owned()))
        };
        let mut parser = final_parser(map_res(digit1, lookup));
        let error = parser("123").unwrap_err();
        assert!(error.is_lookup_failure());
        assert_eq!(error.fragment(), "123");
        assert_eq!(error.labels().unwrap().next().unwrap().label(), Some("element not found"));
    }
}
