//! Bridges between the local formula parser and external services that understand free-text names or molecular
//! structures

use std::fmt::Display;

// External Crate Imports
use log::{debug, warn};

// Local Crate Imports
use crate::{
    AtomicDatabase, Charge, Formula, FormulaError, FormulaNormalizer, Metadata, Resolution, Result,
    StructureFormula, StructureResolver, Unresolved, atoms::formula::adduct_expression,
};

// Closures as Collaborators ===========================================================================================

impl<F, E> FormulaNormalizer for F
where
    F: Fn(&str) -> std::result::Result<String, E>,
    E: Display,
{
    type Error = E;

    fn normalize(&self, raw: &str) -> std::result::Result<String, Self::Error> {
        self(raw)
    }
}

impl<F, E> StructureResolver for F
where
    F: Fn(&str) -> std::result::Result<StructureFormula, E>,
    E: Display,
{
    type Error = E;

    fn resolve(&self, structure: &str) -> std::result::Result<StructureFormula, Self::Error> {
        self(structure)
    }
}

// Public API ==========================================================================================================

impl<'a> Formula<'a> {
    /// Parses `raw` locally, deferring to a [`FormulaNormalizer`] (via [`Resolution::NeedsRemoteResolution`]) only
    /// when the text itself can't be understood
    ///
    /// # Errors
    ///
    /// Any failure that isn't about the formula text, like a malformed adduct or an adduct that removes more atoms
    /// than the formula contains, is returned immediately.
    pub fn resolve(
        db: &'a AtomicDatabase,
        raw: impl AsRef<str>,
        adduct: Option<&str>,
        metadata: Metadata,
    ) -> Result<Resolution<'a>> {
        let raw = raw.as_ref();
        let adduct = adduct_expression(adduct);
        match Self::parse(db, raw) {
            Ok((elements, charge)) => {
                Self::assemble(db, elements, charge, adduct, metadata).map(Resolution::Parsed)
            }
            Err(error) if error.is_formula_text_error() => {
                debug!("deferring {raw:?} to remote resolution: {error}");
                Ok(Resolution::NeedsRemoteResolution(Unresolved {
                    atomic_db: db,
                    raw: raw.to_owned(),
                    adduct,
                    metadata,
                    error,
                }))
            }
            Err(error) => Err(error),
        }
    }

    /// Builds a formula from a molecular structure (like SMILES or InChI) with the help of a [`StructureResolver`]
    ///
    /// The structure is recorded in the formula's metadata under `"structure"`. If the resolver reports a formal
    /// charge and the Hill formula it returned doesn't carry one, that formal charge is used.
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::Resolution`] if the resolver fails, and otherwise for any of the reasons that
    /// [`Formula::with_adduct()`] might.
    pub fn from_structure<R: StructureResolver + ?Sized>(
        db: &'a AtomicDatabase,
        resolver: &R,
        structure: impl AsRef<str>,
        adduct: Option<&str>,
    ) -> Result<Self> {
        let structure = structure.as_ref();
        let StructureFormula {
            hill,
            formal_charge,
        } = resolver.resolve(structure).map_err(|reason| {
            warn!("failed to resolve the structure {structure:?}: {reason}");
            FormulaError::resolution(structure, reason)
        })?;

        let (elements, mut charge) = Self::parse(db, &hill)?;
        if charge == Charge::Neutral {
            if let Some(formal_charge) = formal_charge {
                charge = Charge::try_from(formal_charge)?;
            }
        }

        let mut metadata = Metadata::default();
        metadata.insert("structure".to_owned(), structure.into());
        Self::assemble(db, elements, charge, adduct_expression(adduct), metadata)
    }
}

impl<'a> Unresolved<'a> {
    /// The text that couldn't be parsed locally
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Why the text couldn't be parsed locally
    #[must_use]
    pub fn error(&self) -> &FormulaError {
        &self.error
    }

    #[must_use]
    pub fn into_error(self) -> Box<FormulaError> {
        self.error
    }

    /// Asks `normalizer` for a Hill formula and parses that instead, keeping the original adduct and metadata
    ///
    /// # Errors
    ///
    /// If the normalizer fails, the original local parsing error is returned. If the normalized formula still can't
    /// be parsed, that new error is returned.
    pub fn resolve_with<N: FormulaNormalizer + ?Sized>(
        self,
        normalizer: &N,
    ) -> Result<Formula<'a>> {
        match normalizer.normalize(&self.raw) {
            Ok(hill) => {
                debug!("normalized {:?} into {hill:?}", self.raw);
                Formula::from_hill(self.atomic_db, hill, self.adduct.as_deref(), self.metadata)
            }
            Err(reason) => {
                warn!("failed to normalize {:?}: {reason}", self.raw);
                Err(self.error)
            }
        }
    }
}

// Module Tests ========================================================================================================
