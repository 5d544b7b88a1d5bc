use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

// External Crate Imports
use log::trace;
use rust_decimal::Decimal;

// Local Crate Imports
use crate::{
    Adduct, AtomicDatabase, Charge, Charged, Count, Element, ElementCounts, Formula, FormulaError,
    Massive, Metadata, Result,
    parsers::{
        adduct::{AdductExpression, adduct},
        errors::final_parser,
    },
};

// Public API ==========================================================================================================

impl<'a> Adduct<'a> {
    /// Parses an adduct expression, like `[M+H]+`, `[2M+Na]+`, or `[M+H-H2O]+`
    ///
    /// Atoms added and removed by the expression are netted out per element, so `[M+H-H2O]+` removes a single OH.
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::MalformedAdduct`] if the expression isn't a valid adduct, or with
    /// [`FormulaError::UnknownElement`] if it names an element or isotope missing from `db`.
    pub fn new(db: &'a AtomicDatabase, expression: impl AsRef<str>) -> Result<Self> {
        let expression = expression.as_ref().trim();
        trace!("parsing the adduct {expression:?}");

        let mut parser = final_parser(adduct(db));
        let AdductExpression {
            multimer,
            terms,
            charge,
        } = parser(expression).map_err(FormulaError::adduct)?;

        let mut net_counts: BTreeMap<Element<'a>, i128> = BTreeMap::new();
        for (offset_kind, repeats, group) in terms {
            for (element, count) in group {
                let atoms = i128::from(repeats.get()) * i128::from(count);
                *net_counts.entry(element).or_default() += offset_kind.offset(atoms);
            }
        }

        let (mut added, mut removed) = (ElementCounts::new(), ElementCounts::new());
        for (element, net_count) in net_counts {
            let magnitude = u32::try_from(net_count.unsigned_abs())
                .map_err(|_| FormulaError::count_overflow(&element))?;
            if let Some(count) = Count::new(magnitude) {
                let side = if net_count > 0 { &mut added } else { &mut removed };
                side.insert(element, count);
            }
        }

        let neutral = |elements: ElementCounts<'a>| {
            Formula::assemble(db, elements, Charge::Neutral, None, Metadata::default())
        };
        Ok(Self {
            multimer,
            formula_plus: neutral(added)?,
            formula_minus: neutral(removed)?,
            charge,
        })
    }

    /// How many copies of the molecule (`M`) this adduct contains
    #[must_use]
    pub const fn multimer(&self) -> u32 {
        self.multimer.get()
    }

    /// The neutral atoms gained by the ion
    #[must_use]
    pub const fn formula_plus(&self) -> &Formula<'a> {
        &self.formula_plus
    }

    /// The neutral atoms lost by the ion
    #[must_use]
    pub const fn formula_minus(&self) -> &Formula<'a> {
        &self.formula_minus
    }
}

// Trait Implementations ===============================================================================================

impl Massive for Adduct<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.formula_plus.monoisotopic_mass() - self.formula_minus.monoisotopic_mass()
    }
}

impl Charged for Adduct<'_> {
    fn charge(&self) -> Charge {
        self.charge
    }
}

impl Display for Adduct<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}M", self.multimer)?;
        if !self.formula_plus.elements.is_empty() {
            write!(f, "+{}", self.formula_plus)?;
        }
        if !self.formula_minus.elements.is_empty() {
            write!(f, "-{}", self.formula_minus)?;
        }
        write!(f, "]")?;

        let magnitude = self.charge.magnitude();
        if magnitude > 1 {
            write!(f, "{magnitude}")?;
        }
        write!(f, "{}", self.charge.sign())
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use rust_decimal_macros::dec;

    use crate::testing_tools::assert_miette_report;

    use super::*;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn adduct(expression: &str) -> Adduct<'static> {
        Adduct::new(&DB, expression).unwrap()
    }

    fn counts(formula: &Formula) -> Vec<(String, u32)> {
        formula
            .elements()
            .map(|(element, count)| (element.to_string(), count))
            .collect()
    }

    #[test]
    fn protonated() {
        let protonated = adduct("[M+H]+");
        assert_eq!(protonated.multimer(), 1);
        assert_eq!(i64::from(protonated.charge()), 1);
        assert_eq!(protonated.charge().sign(), "+");
        assert_eq!(counts(protonated.formula_plus()), [("H".to_owned(), 1)]);
        assert!(counts(protonated.formula_minus()).is_empty());
        assert_eq!(protonated.monoisotopic_mass(), dec!(1.0078250321));
    }

    #[test]
    fn multimers() {
        assert_eq!(adduct("[5M+H]+").multimer(), 5);
        assert_eq!(adduct("[2M-H]-").multimer(), 2);
        assert_eq!(adduct("[M]").multimer(), 1);
    }

    #[test]
    fn charges() {
        let charge = |expression| i64::from(adduct(expression).charge());
        assert_eq!(charge("[M+2H]2+"), 2);
        assert_eq!(charge("[M-3H]3-"), -3);
        assert_eq!(charge("[M+Na]"), 0);
        // Without a sign, the adduct is neutral
        assert_eq!(charge("[M+H]2"), 0);
    }

    #[test]
    fn terms_cancel_out() {
        let dehydrated = adduct("[M+H-H2O]+");
        assert!(counts(dehydrated.formula_plus()).is_empty());
        assert_eq!(
            counts(dehydrated.formula_minus()),
            [("H".to_owned(), 1), ("O".to_owned(), 1)]
        );
        assert_eq!(dehydrated.monoisotopic_mass(), dec!(-17.0027400321));

        let unchanged = adduct("[M+H2O-H2O]");
        assert!(counts(unchanged.formula_plus()).is_empty());
        assert!(counts(unchanged.formula_minus()).is_empty());
        assert_eq!(unchanged.monoisotopic_mass(), Decimal::ZERO);
    }

    #[test]
    fn repeated_terms() {
        let sodiated = adduct("[M+2Na-H]+");
        assert_eq!(counts(sodiated.formula_plus()), [("Na".to_owned(), 2)]);
        assert_eq!(counts(sodiated.formula_minus()), [("H".to_owned(), 1)]);

        let acetonitrile = adduct("[2M+CH3CN+H]2+");
        assert_eq!(acetonitrile.formula_plus().to_string(), "C2H4N");
        assert_eq!(adduct("[M+2H2O+H2O]").formula_plus().to_string(), "H6O3");
    }

    #[test]
    fn adduct_errors() {
        let adduct = |expression| Adduct::new(&DB, expression);
        for malformed in ["[3]", "M+H", "[M+H", "[M+]+", "[0M+H]+", "[M+H]+ +", "[Mg+H]+", ""] {
            let error = adduct(malformed).unwrap_err();
            assert!(matches!(*error, FormulaError::MalformedAdduct(_)), "{malformed:?}: {error:?}");
        }
        let error = adduct("[M+Xx]+").unwrap_err();
        assert!(matches!(*error, FormulaError::UnknownElement(_)));

        assert_miette_report!(adduct("[3]"), ["expected 'M'", "[3]"]);
        assert_miette_report!(adduct("[M+H"), ["expected ']'"]);
        assert_miette_report!(adduct("[M+Xx]+"), ["element not found"]);
    }

    #[test]
    fn adduct_display() {
        for expression in [
            "[M+H]+", "[M-H]-", "[2M+Na]+", "[M+H2]2+", "[M-H3]3-", "[M]", "[M+K-H2]-",
        ] {
            assert_eq!(adduct(expression).to_string(), expression);
        }
        // Terms are netted out and regrouped
        assert_eq!(adduct("[M+H-H2O]+").to_string(), "[M-HO]+");
        assert_eq!(adduct("[M+2H]2+").to_string(), "[M+H2]2+");
        assert_eq!(adduct("[M+Na-H+K-H]").to_string(), "[M+KNa-H2]");
        assert_eq!(adduct(" [M+H]2 ").to_string(), "[M+H]");
    }
}
