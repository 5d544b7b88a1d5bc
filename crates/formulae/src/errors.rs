use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

use crate::{Element, parsers::errors::LabeledError};

pub type Result<T, E = Box<FormulaError>> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum FormulaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedFormula(LabeledError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedAdduct(LabeledError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownElement(LabeledError),

    #[diagnostic(help(
        "an adduct or subtraction can only remove atoms that are already present in the formula"
    ))]
    #[error("cannot remove {removed} of {element} when only {available} are present")]
    NegativeElementCount {
        element: String,
        available: u32,
        removed: u32,
    },

    #[error("expected a positive count for {subject}, but found {count}")]
    NonPositiveCount { subject: String, count: i64 },

    #[error("the count of {element} is too large to be represented")]
    CountOverflow { element: String },

    #[diagnostic(help("charges must be written with a sign of \"+\" or \"-\", or no sign at all if neutral"))]
    #[error("the charge sign {sign:?} cannot be combined with a magnitude of {magnitude}")]
    InvalidCharge { sign: String, magnitude: u32 },

    #[error("a net charge of {charge} is too large to be represented")]
    ChargeOverflow { charge: i64 },

    #[error("failed to resolve {input:?} into a chemical formula: {reason}")]
    Resolution { input: String, reason: String },
}

impl FormulaError {
    pub(crate) fn formula(error: LabeledError) -> Self {
        if error.is_lookup_failure() {
            Self::UnknownElement(error)
        } else {
            Self::MalformedFormula(error)
        }
    }

    pub(crate) fn adduct(error: LabeledError) -> Self {
        if error.is_lookup_failure() {
            Self::UnknownElement(error)
        } else {
            Self::MalformedAdduct(error)
        }
    }

    pub(crate) fn negative_count(element: &Element, available: u32, removed: u32) -> Self {
        let element = element.to_string();

        Self::NegativeElementCount {
            element,
            available,
            removed,
        }
    }

    pub(crate) fn non_positive_count(subject: impl Display, count: i64) -> Self {
        let subject = subject.to_string();

        Self::NonPositiveCount { subject, count }
    }

    pub(crate) fn count_overflow(element: &Element) -> Self {
        let element = element.to_string();

        Self::CountOverflow { element }
    }

    pub(crate) fn invalid_charge(sign: &str, magnitude: u32) -> Self {
        let sign = sign.to_owned();

        Self::InvalidCharge { sign, magnitude }
    }

    pub(crate) fn resolution(input: &str, reason: impl Display) -> Self {
        let input = input.to_owned();
        let reason = reason.to_string();

        Self::Resolution { input, reason }
    }

    /// True when the formula text itself could not be understood, as opposed to failures of algebra or adducts
    #[must_use]
    pub const fn is_formula_text_error(&self) -> bool {
        matches!(self, Self::MalformedFormula(_) | Self::UnknownElement(_))
    }
}
