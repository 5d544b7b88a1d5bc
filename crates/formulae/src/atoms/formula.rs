use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

// External Crate Imports
use itertools::Itertools;
use log::{debug, trace};
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{
    Adduct, AtomicDatabase, Charge, Charged, Count, Element, ElementCounts, Formula, FormulaError,
    FormulaType, Massive, Metadata, PpmTolerance, Result, absolute_to_ppm,
    parsers::{errors::final_parser, formula::formula, normalize::normalize},
};

use super::mass::charged_mass;

// Public API ==========================================================================================================

impl<'a> Formula<'a> {
    /// Parses a formula written in Hill notation, like `C2H6O` or `SO4-2`, without any adduct
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::MalformedFormula`] if the text isn't a valid formula, or with
    /// [`FormulaError::UnknownElement`] if it names an element or isotope missing from `db`.
    pub fn new(db: &'a AtomicDatabase, formula: impl AsRef<str>) -> Result<Self> {
        Self::from_hill(db, formula, None, Metadata::default())
    }

    /// Parses a formula and attaches an adduct expression, like `[M+H]+`, to it
    ///
    /// # Errors
    ///
    /// Fails for the same reasons as [`Formula::new()`], if the adduct is malformed, or if the adduct removes more
    /// atoms than the (multimerised) formula contains.
    pub fn with_adduct(
        db: &'a AtomicDatabase,
        formula: impl AsRef<str>,
        adduct: impl AsRef<str>,
    ) -> Result<Self> {
        Self::from_hill(db, formula, Some(adduct.as_ref()), Metadata::default())
    }

    /// The most general text constructor: an adduct of `None`, `""`, or `"None"` means that no adduct is attached
    ///
    /// # Errors
    ///
    /// See [`Formula::with_adduct()`].
    pub fn from_hill(
        db: &'a AtomicDatabase,
        formula: impl AsRef<str>,
        adduct: Option<&str>,
        metadata: Metadata,
    ) -> Result<Self> {
        let (elements, charge) = Self::parse(db, formula.as_ref())?;
        Self::assemble(db, elements, charge, adduct_expression(adduct), metadata)
    }

    /// Builds a formula from raw element counts, summing any elements that are repeated
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::NonPositiveCount`] if any count is zero or negative, and otherwise for the same
    /// adduct-related reasons as [`Formula::with_adduct()`].
    pub fn from_element_counts(
        db: &'a AtomicDatabase,
        counts: impl IntoIterator<Item = (Element<'a>, i64)>,
        charge: Charge,
        adduct: Option<&str>,
        metadata: Metadata,
    ) -> Result<Self> {
        let mut elements = ElementCounts::new();
        for (element, count) in counts {
            if count <= 0 {
                return Err(FormulaError::non_positive_count(element, count).into());
            }
            let count = u32::try_from(count)
                .ok()
                .and_then(Count::new)
                .ok_or_else(|| FormulaError::count_overflow(&element))?;
            accumulate(&mut elements, element, count)?;
        }
        Self::assemble(db, elements, charge, adduct_expression(adduct), metadata)
    }

    // -----------------------------------------------------------------------------------------------------------------

    /// Sums the element counts and charges of two formulas, keeping the adduct and metadata of `self`
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::CountOverflow`] or [`FormulaError::ChargeOverflow`] if the sums are too large to
    /// represent.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let elements = add_counts(self.elements.clone(), &other.elements)?;
        let charge = self.charge.checked_add(other.charge)?;
        self.derive(elements, charge)
    }

    /// # Errors
    ///
    /// Fails with [`FormulaError::NegativeElementCount`] if `other` contains more of any element than `self`.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        let elements = subtract_counts(self.elements.clone(), &other.elements)?;
        let charge = self.charge.checked_sub(other.charge)?;
        self.derive(elements, charge)
    }

    /// Scales every element count by `factor`, leaving the charge and adduct untouched
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::NonPositiveCount`] if `factor` is zero.
    pub fn multiply(&self, factor: u32) -> Result<Self> {
        let factor = Count::new(factor)
            .ok_or_else(|| FormulaError::non_positive_count("the multiplier", 0))?;
        let elements = scale_counts(&self.elements, factor)?;
        self.derive(elements, self.charge)
    }

    // -----------------------------------------------------------------------------------------------------------------

    /// The adduct attached to this formula, parsed afresh from its expression
    ///
    /// # Errors
    ///
    /// Never fails for formulas built by this crate, since adducts are validated when a formula is constructed.
    pub fn parsed_adduct(&self) -> Result<Option<Adduct<'a>>> {
        self.adduct
            .as_deref()
            .map(|expression| Adduct::new(self.atomic_db, expression))
            .transpose()
    }

    /// The molecule produced by applying this formula's adduct, which carries the combined charge and no adduct
    ///
    /// # Errors
    ///
    /// See [`Formula::parsed_adduct()`].
    pub fn with_adduct_applied(&self) -> Result<Self> {
        let (elements, charge) = match self.parsed_adduct()? {
            Some(adduct) => combine(&self.elements, self.charge, &adduct)?,
            None => (self.elements.clone(), self.charge),
        };
        Self::assemble(self.atomic_db, elements, charge, None, self.metadata.clone())
    }

    /// Renders the ion produced by this formula's adduct, like `[C2H7O]+` for `C2H6O` with `[M+H]+`
    ///
    /// Adducts that carry no charge of their own render as a plain formula.
    ///
    /// # Errors
    ///
    /// See [`Formula::parsed_adduct()`].
    pub fn final_formula_with_adduct(&self) -> Result<String> {
        let Some(adduct) = self.parsed_adduct()? else {
            return Ok(self.to_string());
        };
        let (elements, charge) = combine(&self.elements, self.charge, &adduct)?;
        let hill = HillNotation(&elements);
        Ok(if adduct.charge() == Charge::Neutral {
            format!("{hill}{charge}")
        } else {
            format!("[{hill}]{charge}")
        })
    }

    // -----------------------------------------------------------------------------------------------------------------

    /// Each element (or isotope) in this formula with its count, in alphabetical order
    pub fn elements(&self) -> impl Iterator<Item = (Element<'a>, u32)> + '_ {
        self.elements
            .iter()
            .map(|(&element, &count)| (element, count.get()))
    }

    /// The count of an element written as it would be in a formula, like `"H"` or `"[13]C"`, or 0 if it's absent
    #[must_use]
    pub fn count(&self, element: impl AsRef<str>) -> u32 {
        let element = element.as_ref();
        self.elements
            .iter()
            .find(|(e, _)| e.to_string() == element)
            .map_or(0, |(_, count)| count.get())
    }

    #[must_use]
    pub fn adduct(&self) -> Option<&str> {
        self.adduct.as_deref()
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The m/z of the ion formed by this formula's adduct, or just [`Massive::monoisotopic_mass()`] without one
    #[must_use]
    pub const fn monoisotopic_mass_with_adduct(&self) -> Decimal {
        self.monoisotopic_mass_with_adduct
    }

    #[must_use]
    pub fn formula_type(&self) -> FormulaType {
        FormulaType::classify(self.elements.keys())
    }

    // -----------------------------------------------------------------------------------------------------------------

    /// Whether `external` falls within `tolerance` of this formula's monoisotopic mass
    #[must_use]
    pub fn check_monoisotopic_mass(
        &self,
        external: Decimal,
        tolerance: impl Into<PpmTolerance>,
    ) -> bool {
        tolerance
            .into()
            .contains(self.monoisotopic_mass, external)
    }

    /// Whether `external` falls within `tolerance` of this formula's monoisotopic mass with its adduct applied
    #[must_use]
    pub fn check_monoisotopic_mass_with_adduct(
        &self,
        external: Decimal,
        tolerance: impl Into<PpmTolerance>,
    ) -> bool {
        tolerance
            .into()
            .contains(self.monoisotopic_mass_with_adduct, external)
    }

    /// The ppm error of an experimentally observed mass, relative to this formula's mass with its adduct applied
    #[must_use]
    pub fn ppm_difference_with_exp_mass(&self, experimental: Decimal) -> Option<Decimal> {
        absolute_to_ppm(self.monoisotopic_mass_with_adduct, experimental)
    }
}

// Crate-Internal Construction =========================================================================================

impl<'a> Formula<'a> {
    pub(crate) fn parse(db: &'a AtomicDatabase, text: &str) -> Result<(ElementCounts<'a>, Charge)> {
        let text = normalize(text.trim());
        trace!("parsing the formula {text:?}");

        let mut parser = final_parser(formula(db));
        let (terms, charge) = parser(&text).map_err(FormulaError::formula)?;

        let mut totals: BTreeMap<Element<'a>, u64> = BTreeMap::new();
        for (element, count) in terms {
            *totals.entry(element).or_default() += u64::from(count);
        }

        // NOTE: Individual terms may have a count of zero, but every element must end up with a positive total
        let elements = totals
            .into_iter()
            .map(|(element, total)| -> Result<(Element<'a>, Count)> {
                let total = u32::try_from(total)
                    .map_err(|_| FormulaError::count_overflow(&element))?;
                let count = Count::new(total)
                    .ok_or_else(|| FormulaError::non_positive_count(element, 0))?;
                Ok((element, count))
            })
            .collect::<Result<ElementCounts>>()?;
        Ok((elements, charge))
    }

    pub(crate) fn assemble(
        db: &'a AtomicDatabase,
        elements: ElementCounts<'a>,
        charge: Charge,
        adduct: Option<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let monoisotopic_mass = charged_mass(db, &elements, charge);
        let monoisotopic_mass_with_adduct = match &adduct {
            Some(expression) => {
                let adduct = Adduct::new(db, expression)?;
                let (combined, final_charge) = combine(&elements, charge, &adduct)?;
                let mass = charged_mass(db, &combined, final_charge);
                debug!(
                    "applied {adduct} to {}{charge}, giving {}{final_charge} at {mass}",
                    HillNotation(&elements),
                    HillNotation(&combined)
                );
                mass
            }
            None => monoisotopic_mass,
        };

        Ok(Self {
            atomic_db: db,
            elements,
            charge,
            adduct,
            monoisotopic_mass,
            monoisotopic_mass_with_adduct,
            metadata,
        })
    }

    fn derive(&self, elements: ElementCounts<'a>, charge: Charge) -> Result<Self> {
        Self::assemble(
            self.atomic_db,
            elements,
            charge,
            self.adduct.clone(),
            self.metadata.clone(),
        )
    }
}

/// Blank expressions, and the literal `"None"`, stand for no adduct at all
pub(crate) fn adduct_expression(adduct: Option<&str>) -> Option<String> {
    adduct
        .map(str::trim)
        .filter(|expression| !expression.is_empty() && *expression != "None")
        .map(str::to_owned)
}

// Element Count Arithmetic ============================================================================================

fn combine<'a>(
    elements: &ElementCounts<'a>,
    charge: Charge,
    adduct: &Adduct<'a>,
) -> Result<(ElementCounts<'a>, Charge)> {
    let scaled = scale_counts(elements, adduct.multimer)?;
    let added = add_counts(scaled, &adduct.formula_plus.elements)?;
    let combined = subtract_counts(added, &adduct.formula_minus.elements)?;
    Ok((combined, charge.checked_add(adduct.charge)?))
}

fn accumulate<'a>(
    elements: &mut ElementCounts<'a>,
    element: Element<'a>,
    count: Count,
) -> Result<()> {
    match elements.entry(element) {
        Entry::Vacant(entry) => {
            entry.insert(count);
        }
        Entry::Occupied(mut entry) => {
            let total = entry
                .get()
                .checked_add(count)
                .ok_or_else(|| FormulaError::count_overflow(&element))?;
            entry.insert(total);
        }
    }
    Ok(())
}

fn scale_counts<'a>(elements: &ElementCounts<'a>, factor: Count) -> Result<ElementCounts<'a>> {
    elements
        .iter()
        .map(|(&element, &count)| {
            count
                .checked_mul(factor)
                .map(|count| (element, count))
                .ok_or_else(|| Box::new(FormulaError::count_overflow(&element)))
        })
        .collect()
}

fn add_counts<'a>(
    mut lhs: ElementCounts<'a>,
    rhs: &ElementCounts<'a>,
) -> Result<ElementCounts<'a>> {
    for (&element, &count) in rhs {
        accumulate(&mut lhs, element, count)?;
    }
    Ok(lhs)
}

fn subtract_counts<'a>(
    mut lhs: ElementCounts<'a>,
    rhs: &ElementCounts<'a>,
) -> Result<ElementCounts<'a>> {
    for (&element, &removed) in rhs {
        let available = lhs.get(&element).map_or(0, |count| count.get());
        let remaining = available
            .checked_sub(removed.get())
            .ok_or_else(|| FormulaError::negative_count(&element, available, removed.get()))?;
        // NOTE: Elements whose count drops to zero are removed entirely, never stored as zero
        match Count::new(remaining) {
            Some(count) => lhs.insert(element, count),
            None => lhs.remove(&element),
        };
    }
    Ok(lhs)
}

// Trait Implementations ===============================================================================================

impl Massive for Formula<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.monoisotopic_mass
    }
}

impl Charged for Formula<'_> {
    fn charge(&self) -> Charge {
        self.charge
    }
}

/// Hill notation: carbon first, then hydrogen, then everything else alphabetically. Without any carbon, every element
/// (hydrogen included) is listed alphabetically.
struct HillNotation<'f, 'a>(&'f ElementCounts<'a>);

impl Display for HillNotation<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let has_carbon = self.0.keys().any(|element| element.symbol() == "C");
        let rank = |element: &Element| match element.symbol() {
            "C" if has_carbon => 0,
            "H" if has_carbon => 1,
            _ => 2,
        };
        for (element, count) in self.0.iter().sorted_by_key(|(element, _)| rank(element)) {
            write!(f, "{element}{count}")?;
        }
        Ok(())
    }
}

/// Hill notation followed by the charge, like `O4S-2`, which parses back into an equal formula
///
/// The adduct is left out, so that the text can be fed straight back into [`Formula::new()`]. The alternate form
/// (`{:#}`) appends the adduct after a space, like `H2O [M+H]+`.
impl Display for Formula<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HillNotation(&self.elements), self.charge)?;
        if let Some(adduct) = self.adduct.as_deref().filter(|_| f.alternate()) {
            write!(f, " {adduct}")?;
        }
        Ok(())
    }
}

impl Debug for Formula<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("elements", &HillNotation(&self.elements).to_string())
            .field("charge", &self.charge)
            .field("adduct", &self.adduct)
            .field("monoisotopic_mass", &self.monoisotopic_mass)
            .field("monoisotopic_mass_with_adduct", &self.monoisotopic_mass_with_adduct)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

// NOTE: Two formulas are equal when they contain the same atoms and carry the same adduct expression. Their charges
// and metadata are not compared, so `H2O-1` equals `H2O`.
impl PartialEq for Formula<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.adduct == other.adduct
    }
}

impl Eq for Formula<'_> {}

impl Hash for Formula<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
        self.adduct.hash(state);
    }
}

// Module Tests ========================================================================================================
