// External Crate Imports
use nom::{
    Parser,
    character::complete::char,
    combinator::{cut, map, opt},
    multi::many0,
    sequence::{pair, preceded, tuple},
};

// Local Crate Imports
use super::{
    errors::{FormulaErrorKind, ParseResult, expect, wrap_err},
    formula::{Term, terms},
    primitives::{count, offset_kind},
};
use crate::{AtomicDatabase, Charge, Count, OffsetKind};

/// A signed, optionally repeated group of atoms from an adduct body, like the `-2H2O` in `[M-2H2O+H]+`
pub(crate) type AdductTerm<'a> = (OffsetKind, Count, Vec<Term<'a>>);

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct AdductExpression<'a> {
    pub(crate) multimer: Count,
    pub(crate) terms: Vec<AdductTerm<'a>>,
    pub(crate) charge: Charge,
}

// Public API ==========================================================================================================

// NOTE: These are not meant to be links, it's just EBNF
#[allow(clippy::doc_link_with_quotes)]
/// Adduct = "[" , [ Count ] , "M" , { Adduct Term } , "]" , [ Adduct Charge ] ;
pub(crate) fn adduct<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, AdductExpression<'a>> {
    let opening_bracket = expect(char('['), FormulaErrorKind::ExpectedAdductStart);
    let multimer = opt(count).map(Option::unwrap_or_default);
    let molecule = expect(cut(char('M')), FormulaErrorKind::ExpectedMolecule);
    let body = many0(adduct_term(db));
    let closing_bracket = expect(cut(char(']')), FormulaErrorKind::ExpectedAdductEnd);

    let parser = tuple((
        preceded(opening_bracket, multimer),
        preceded(molecule, body),
        preceded(closing_bracket, adduct_charge),
    ));
    let parser = map(parser, |(multimer, terms, charge)| AdductExpression {
        multimer,
        terms,
        charge,
    });
    wrap_err(parser, FormulaErrorKind::ExpectedAdduct)
}

// Private Sub-Parsers =================================================================================================

/// Adduct Term = Offset Kind , [ Count ] , Terms ;
fn adduct_term<'a, 's>(
    db: &'a AtomicDatabase,
) -> impl FnMut(&'s str) -> ParseResult<'s, AdductTerm<'a>> {
    let optional_count = opt(count).map(Option::unwrap_or_default);
    let parser = tuple((offset_kind, optional_count, cut(terms(db))));
    wrap_err(parser, FormulaErrorKind::ExpectedAdductTerm)
}

/// Adduct Charge = [ Count ] , [ Offset Kind ] ;
fn adduct_charge(i: &str) -> ParseResult<Charge> {
    // NOTE: Without a sign, any count is ignored and the adduct is neutral
    map(pair(opt(count), opt(offset_kind)), |(count, kind)| {
        kind.map_or(Charge::Neutral, |kind| {
            Charge::from_offset(kind, count.unwrap_or_default())
        })
    })(i)
}

// Module Tests ========================================================================================================
