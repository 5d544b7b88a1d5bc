//! Exact monoisotopic masses and formula algebra for chemical formulas and mass-spectrometry adducts

pub mod atoms;
pub mod errors;
pub mod parsers;
pub mod resolution;
#[cfg(test)]
mod testing_tools;

use std::{
    collections::BTreeMap,
    fmt::Display,
    num::NonZeroU32,
};

// External Crate Imports
use ahash::HashMap;
use derive_more::{IsVariant, Unwrap};
use rust_decimal::Decimal;
use serde::Serialize;
use static_assertions::assert_impl_all;

pub use atoms::{
    atomic_database::AtomicDatabase,
    tolerance::{PpmTolerance, absolute_to_ppm, ppm_to_absolute},
};
pub use errors::{FormulaError, Result};

// NOTE: For the types in this module, 'a lifetimes indicate references to the `AtomicDatabase`

/// Opaque, caller-supplied data carried alongside a [`Formula`] but never interpreted by it
pub type Metadata = HashMap<String, serde_json::Value>;

type ElementCounts<'a> = BTreeMap<Element<'a>, Count>;

#[derive(Clone)]
pub struct Formula<'a> {
    atomic_db: &'a AtomicDatabase,
    elements: ElementCounts<'a>,
    charge: Charge,
    adduct: Option<String>,
    monoisotopic_mass: Decimal,
    monoisotopic_mass_with_adduct: Decimal,
    metadata: Metadata,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Adduct<'a> {
    multimer: Count,
    formula_plus: Formula<'a>,
    formula_minus: Formula<'a>,
    charge: Charge,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct Element<'a> {
    symbol: &'a str,
    name: &'a str,
    mass_number: Option<MassNumber>,
    mass: Decimal,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct Count(NonZeroU32);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct MassNumber(NonZeroU32);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum OffsetKind {
    Add,
    Remove,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize)]
pub enum Charge {
    #[default]
    Neutral,
    Positive(NonZeroU32),
    Negative(NonZeroU32),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, derive_more::Display)]
pub enum FormulaType {
    #[display("CHNOPS")]
    Chnops,
    #[display("CHNOPSCL")]
    ChnopsCl,
    #[display("CHNOPSD")]
    ChnopsD,
    #[display("CHNOPSCLD")]
    ChnopsClD,
    #[display("ALL")]
    All,
    #[display("ALLD")]
    AllD,
}

// External Collaborators ==============================================================================================

/// The result of attempting to parse a raw formula locally
#[derive(Debug, IsVariant, Unwrap)]
pub enum Resolution<'a> {
    Parsed(Formula<'a>),
    NeedsRemoteResolution(Unresolved<'a>),
}

/// A raw formula that failed to parse locally, along with everything needed to finish building it once a
/// [`FormulaNormalizer`] has produced Hill notation for it
#[derive(Debug)]
pub struct Unresolved<'a> {
    atomic_db: &'a AtomicDatabase,
    raw: String,
    adduct: Option<String>,
    metadata: Metadata,
    error: Box<FormulaError>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StructureFormula {
    pub hill: String,
    pub formal_charge: Option<i64>,
}

/// Turns free-text formulas (`"ethanol"`, `"CH3CH2OH"`) into canonical Hill notation, typically by calling out to a
/// remote service
pub trait FormulaNormalizer {
    type Error: Display;

    fn normalize(&self, raw: &str) -> std::result::Result<String, Self::Error>;
}

/// Derives a Hill formula (and optionally a total formal charge) from a molecular structure notation like SMILES or
/// InChI
pub trait StructureResolver {
    type Error: Display;

    fn resolve(&self, structure: &str) -> std::result::Result<StructureFormula, Self::Error>;
}

// =====================================================================================================================

pub trait Massive {
    fn monoisotopic_mass(&self) -> Decimal;
}

pub trait Charged {
    fn charge(&self) -> Charge;
}

// Blanket impls

macro_rules! massive_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Massive> Massive for $ref_type {
                fn monoisotopic_mass(&self) -> Decimal {
                    (**self).monoisotopic_mass()
                }
            }
        )+
    };
}

massive_ref_impls!(&T, &mut T, Box<T>);

macro_rules! charged_ref_impls {
    ($($ref_type:ty),+ $(,)?) => {
        $(
            impl<T: Charged> Charged for $ref_type {
                fn charge(&self) -> Charge {
                    (**self).charge()
                }
            }
        )+
    };
}

charged_ref_impls!(&T, &mut T, Box<T>);

assert_impl_all!(AtomicDatabase: Send, Sync);
assert_impl_all!(Formula<'static>: Send, Sync);
assert_impl_all!(Adduct<'static>: Send, Sync);
