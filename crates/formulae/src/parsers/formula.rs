// External Crate Imports
use nom::{
    Parser,
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt, recognize},
    multi::{many0_count, many1},
    sequence::{delimited, pair},
};

// Local Crate Imports
use super::{
    errors::{FormulaErrorKind, ParseResult, expect, map_res, wrap_err},
    primitives::{count, lowercase, offset_kind, term_count, uppercase},
};
use crate::{AtomicDatabase, Charge, Element, MassNumber};

// NOTE: Counts of zero are allowed here, so that `CH2H0` parses. Totals are checked once terms are
// accumulated.
pub(crate) type Term<'a> = (Element<'a>, u32);

// Public API ==========================================================================================================

/// Formula = { Term }- , [ Charge Suffix ] ;
pub fn formula<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, (Vec<Term<'a>>, Charge)> {
    let optional_charge = opt(charge_suffix).map(Option::unwrap_or_default);
    let parser = pair(terms(db), optional_charge);
    wrap_err(parser, FormulaErrorKind::ExpectedFormula)
}

/// Terms = { Term }- ;
pub(crate) fn terms<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, Vec<Term<'a>>> {
    many1(term(db))
}

// Private Sub-Parsers =================================================================================================

/// Term = ( Element | Isotope ) , [ Term Count ] ;
fn term<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Term<'a>> {
    let element_or_isotope = alt((element(db), isotope(db)));
    let optional_count = opt(term_count).map(|count| count.unwrap_or(1));
    let parser = pair(element_or_isotope, optional_count);
    wrap_err(parser, FormulaErrorKind::ExpectedTerm)
}

/// Element = Element Symbol ;
fn element<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    map_res(element_symbol, |symbol| Element::new(db, symbol))
}

/// Isotope = Isotope Tag , Element Symbol ;
fn isotope<'a, 's>(db: &'a AtomicDatabase) -> impl FnMut(&'s str) -> ParseResult<'s, Element<'a>> {
    let parser = pair(isotope_tag, cut(element_symbol));
    map_res(parser, |(mass_number, symbol)| {
        Element::new_isotope(db, symbol, mass_number)
    })
}

// ---------------------------------------------------------------------------------------------------------------------

/// Element Symbol = uppercase , { lowercase } ;
fn element_symbol(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(uppercase, many0_count(lowercase)));
    wrap_err(parser, FormulaErrorKind::ExpectedElementSymbol)(i)
}

// NOTE: These are not meant to be links, it's just EBNF
#[allow(clippy::doc_link_with_quotes)]
/// Isotope Tag = "[" , Count , "]" ;
fn isotope_tag(i: &str) -> ParseResult<MassNumber> {
    let opening_bracket = expect(char('['), FormulaErrorKind::ExpectedIsotopeStart);
    let mass_number = map(
        wrap_err(count, FormulaErrorKind::ExpectedMassNumber),
        MassNumber::from,
    );
    let closing_bracket = expect(cut(char(']')), FormulaErrorKind::ExpectedIsotopeEnd);
    delimited(opening_bracket, cut(mass_number), closing_bracket)(i)
}

/// Charge Suffix = "(" , Charge , ")" | Charge ;
fn charge_suffix(i: &str) -> ParseResult<Charge> {
    let closing_paren = expect(cut(char(')')), FormulaErrorKind::ExpectedChargeEnd);
    let parenthesised = delimited(char('('), cut(charge), closing_paren);
    alt((parenthesised, charge))(i)
}

/// Charge = Offset Kind , [ Count ] ;
pub(crate) fn charge(i: &str) -> ParseResult<Charge> {
    let optional_count = opt(count).map(Option::unwrap_or_default);
    map(pair(offset_kind, optional_count), |(kind, count)| {
        Charge::from_offset(kind, count)
    })(i)
}

// Module Tests ========================================================================================================
