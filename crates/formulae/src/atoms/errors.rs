use itertools::Itertools;
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::MassNumber;

// NOTE: Public so that callers building their own parsers on top of the element lookups can inspect errors
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum AtomicLookupError {
    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error("the element {0:?} could not be found in the supplied atomic database")]
    Element(String),

    #[diagnostic(help("double-check for typos, or add a new entry to the atomic database"))]
    #[error(
        "the isotope [{1}]{0} could not be found in the supplied atomic database, though the following {0} \
        isotopes were found: {2}"
    )]
    Isotope(String, MassNumber, String),
}

impl AtomicLookupError {
    pub(crate) fn element(symbol: &str) -> Self {
        Self::Element(symbol.to_owned())
    }

    pub(crate) fn isotope(
        symbol: &str,
        mass_number: MassNumber,
        known: impl IntoIterator<Item = MassNumber>,
    ) -> Self {
        let known = format!("[{}]", known.into_iter().join(", "));
        Self::Isotope(symbol.to_owned(), mass_number, known)
    }
}

#[derive(Debug, Diagnostic, Error)]
pub enum AtomicDatabaseError {
    #[error("failed to read the atomic database")]
    Json(#[from] serde_json::Error),

    #[diagnostic(help("element symbols are a single uppercase letter followed by any number of lowercase letters"))]
    #[error("the element symbol {0:?} is invalid")]
    InvalidSymbol(String),

    #[error("the element {0:?} was defined more than once")]
    DuplicateSymbol(String),

    #[error("the mass of {0} must be positive, but found {1}")]
    NonPositiveMass(String, Decimal),

    #[error("the element {0} has an isotope with a mass number of 0")]
    ZeroMassNumber(String),
}
