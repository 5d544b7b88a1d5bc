// Standard Library Imports
use std::collections::BTreeMap;

// External Crate Imports
use ahash::HashMap;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

// Local Module Imports
use super::errors::{AtomicDatabaseError, AtomicLookupError};
use crate::{Element, MassNumber, Result};

/// The mass lost by a molecule for every unit of positive charge it carries
pub const ELECTRON_MASS: Decimal = dec!(0.00054858);

// Public API ==========================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AtomicDatabase {
    pub(super) elements: HashMap<String, ElementDescription>,
    electron_mass: Decimal,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(super) struct ElementDescription {
    pub(super) name: String,
    pub(super) mass: Decimal,
    pub(super) isotopes: BTreeMap<MassNumber, Decimal>,
}

impl AtomicDatabase {
    /// Loads a replacement element table from JSON
    ///
    /// ```json
    /// {
    ///   "electron_mass": "0.00054858",
    ///   "elements": [
    ///     { "symbol": "H", "name": "Hydrogen", "mass": "1.0078250321", "isotopes": { "2": "2.01410177811" } }
    ///   ]
    /// }
    /// ```
    ///
    /// Masses may be written as JSON numbers, but strings are decoded without any loss of precision.
    ///
    /// # Errors
    ///
    /// Fails if the JSON is malformed, if any symbol is invalid or repeated, or if any mass is not positive.
    pub fn from_json(json: impl AsRef<str>) -> Result<Self, AtomicDatabaseError> {
        let DatabaseJson {
            electron_mass,
            elements: entries,
        } = serde_json::from_str(json.as_ref())?;

        if electron_mass <= Decimal::ZERO {
            return Err(AtomicDatabaseError::NonPositiveMass(
                "the electron".to_owned(),
                electron_mass,
            ));
        }

        let mut elements = HashMap::default();
        for entry in entries {
            let (symbol, description) = entry.validate()?;
            if elements.contains_key(&symbol) {
                return Err(AtomicDatabaseError::DuplicateSymbol(symbol));
            }
            elements.insert(symbol, description);
        }
        debug!("loaded an atomic database containing {} elements", elements.len());

        Ok(Self {
            elements,
            electron_mass,
        })
    }

    /// # Errors
    ///
    /// Fails with [`AtomicLookupError::Element`] if `symbol` is not in this database.
    pub fn element(&self, symbol: impl AsRef<str>) -> Result<Element<'_>, AtomicLookupError> {
        Element::new(self, symbol)
    }

    /// # Errors
    ///
    /// Fails if either the element or this particular isotope of it is missing from this database.
    pub fn isotope(
        &self,
        symbol: impl AsRef<str>,
        mass_number: MassNumber,
    ) -> Result<Element<'_>, AtomicLookupError> {
        Element::new_isotope(self, symbol, mass_number)
    }

    #[must_use]
    pub const fn electron_mass(&self) -> Decimal {
        self.electron_mass
    }
}

impl Default for AtomicDatabase {
    fn default() -> Self {
        let mut elements: HashMap<_, _> = ELEMENTS
            .iter()
            .map(|&(symbol, name, mass)| {
                let description = ElementDescription {
                    name: name.to_owned(),
                    mass,
                    isotopes: BTreeMap::new(),
                };
                (symbol.to_owned(), description)
            })
            .collect();

        for &(symbol, mass_number, mass) in ISOTOPES {
            if let (Some(element), Some(mass_number)) =
                (elements.get_mut(symbol), MassNumber::new(mass_number))
            {
                element.isotopes.insert(mass_number, mass);
            }
        }

        Self {
            elements,
            electron_mass: ELECTRON_MASS,
        }
    }
}

// JSON File Schema ====================================================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseJson {
    #[serde(default = "default_electron_mass")]
    electron_mass: Decimal,
    elements: Vec<ElementJson>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementJson {
    symbol: String,
    name: String,
    mass: Decimal,
    #[serde(default)]
    isotopes: BTreeMap<u32, Decimal>,
}

const fn default_electron_mass() -> Decimal {
    ELECTRON_MASS
}

impl ElementJson {
    fn validate(self) -> Result<(String, ElementDescription), AtomicDatabaseError> {
        let Self {
            symbol,
            name,
            mass,
            isotopes,
        } = self;

        if !is_element_symbol(&symbol) {
            return Err(AtomicDatabaseError::InvalidSymbol(symbol));
        }
        if mass <= Decimal::ZERO {
            return Err(AtomicDatabaseError::NonPositiveMass(symbol, mass));
        }

        let mut validated_isotopes = BTreeMap::new();
        for (mass_number, mass) in isotopes {
            let Some(mass_number) = MassNumber::new(mass_number) else {
                return Err(AtomicDatabaseError::ZeroMassNumber(symbol));
            };
            if mass <= Decimal::ZERO {
                return Err(AtomicDatabaseError::NonPositiveMass(
                    format!("[{mass_number}]{symbol}"),
                    mass,
                ));
            }
            validated_isotopes.insert(mass_number, mass);
        }

        let description = ElementDescription {
            name,
            mass,
            isotopes: validated_isotopes,
        };
        Ok((symbol, description))
    }
}

// Element Symbol Validation ===========================================================================================

fn is_element_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_lowercase())
}

// Built-in Monoisotopic Masses ========================================================================================

const ISOTOPES: &[(&str, u32, Decimal)] = &[
    ("H", 2, dec!(2.01410177811)),
    ("Li", 6, dec!(6.0151223)),
    ("C", 13, dec!(13.00335484)),
    ("C", 14, dec!(14.00307401)),
    ("N", 15, dec!(15.00010897)),
    ("O", 18, dec!(17.9991604)),
    ("Cl", 37, dec!(36.9659026)),
];

const ELEMENTS: &[(&str, &str, Decimal)] = &[
    ("H", "Hydrogen", dec!(1.0078250321)),
    ("D", "Deuterium", dec!(2.01410177811)),
    ("He", "Helium", dec!(4.0026032542)),
    ("Li", "Lithium", dec!(7.016004558)),
    ("Be", "Beryllium", dec!(9.012182)),
    ("B", "Boron", dec!(11.009305)),
    ("C", "Carbon", dec!(12.0)),
    ("N", "Nitrogen", dec!(14.003074)),
    ("O", "Oxygen", dec!(15.994915)),
    ("F", "Fluorine", dec!(18.998403163)),
    ("Ne", "Neon", dec!(19.99244)),
    ("Na", "Sodium", dec!(22.98976928)),
    ("Mg", "Magnesium", dec!(23.98504)),
    ("Al", "Aluminium", dec!(26.9815385)),
    ("Si", "Silicon", dec!(27.97693)),
    ("P", "Phosphorus", dec!(30.973761632)),
    ("S", "Sulfur", dec!(31.9720710015)),
    ("Cl", "Chlorine", dec!(34.96885)),
    ("Ar", "Argon", dec!(39.962383)),
    ("K", "Potassium", dec!(38.96371)),
    ("Ca", "Calcium", dec!(39.96259)),
    ("Sc", "Scandium", dec!(44.95591)),
    ("Ti", "Titanium", dec!(47.94794)),
    ("V", "Vanadium", dec!(50.94396)),
    ("Cr", "Chromium", dec!(51.94051)),
    ("Mn", "Manganese", dec!(54.93804)),
    ("Fe", "Iron", dec!(55.93494)),
    ("Co", "Cobalt", dec!(58.93319)),
    ("Ni", "Nickel", dec!(57.93534)),
    ("Cu", "Copper", dec!(62.92960)),
    ("Zn", "Zinc", dec!(63.92914)),
    ("Ga", "Gallium", dec!(68.92557)),
    ("Ge", "Germanium", dec!(73.92118)),
    ("As", "Arsenic", dec!(74.92159)),
    ("Se", "Selenium", dec!(79.91652)),
    ("Br", "Bromine", dec!(78.91834)),
    ("Kr", "Krypton", dec!(83.91150)),
    ("Rb", "Rubidium", dec!(84.91179)),
    ("Sr", "Strontium", dec!(87.90561)),
    ("Y", "Yttrium", dec!(88.90584)),
    ("Zr", "Zirconium", dec!(89.90470)),
    ("Nb", "Niobium", dec!(92.90637)),
    ("Mo", "Molybdenum", dec!(97.90540)),
    ("Tc", "Technetium", dec!(98.0)),
    ("Ru", "Ruthenium", dec!(101.90434)),
    ("Rh", "Rhodium", dec!(102.90550)),
    ("Pd", "Palladium", dec!(105.90348)),
    ("Ag", "Silver", dec!(106.90509)),
    ("Cd", "Cadmium", dec!(113.90337)),
    ("In", "Indium", dec!(114.90388)),
    ("Sn", "Tin", dec!(119.90220)),
    ("Sb", "Antimony", dec!(120.90381)),
    ("Te", "Tellurium", dec!(129.90622)),
    ("I", "Iodine", dec!(126.90447)),
    ("Xe", "Xenon", dec!(131.90416)),
    ("Cs", "Caesium", dec!(132.90545)),
    ("Ba", "Barium", dec!(137.90525)),
    ("La", "Lanthanum", dec!(138.90636)),
    ("Ce", "Cerium", dec!(139.90544)),
    ("Pr", "Praseodymium", dec!(140.90766)),
    ("Nd", "Neodymium", dec!(141.90773)),
    ("Pm", "Promethium", dec!(145.0)),
    ("Sm", "Samarium", dec!(151.91974)),
    ("Eu", "Europium", dec!(152.92124)),
    ("Gd", "Gadolinium", dec!(157.92411)),
    ("Tb", "Terbium", dec!(158.92535)),
    ("Dy", "Dysprosium", dec!(163.92918)),
    ("Ho", "Holmium", dec!(164.93033)),
    ("Er", "Erbium", dec!(165.93030)),
    ("Tm", "Thulium", dec!(168.93422)),
    ("Yb", "Ytterbium", dec!(173.93887)),
    ("Lu", "Lutetium", dec!(174.94078)),
    ("Hf", "Hafnium", dec!(179.94656)),
    ("Ta", "Tantalum", dec!(180.94800)),
    ("W", "Tungsten", dec!(183.95093)),
    ("Re", "Rhenium", dec!(186.95575)),
    ("Os", "Osmium", dec!(191.96148)),
    ("Ir", "Iridium", dec!(192.96292)),
    ("Pt", "Platinum", dec!(194.96479)),
    ("Au", "Gold", dec!(196.96657)),
    ("Hg", "Mercury", dec!(201.97064)),
    ("Tl", "Thallium", dec!(204.97443)),
    ("Pb", "Lead", dec!(207.97665)),
    ("Bi", "Bismuth", dec!(208.98040)),
    ("Po", "Polonium", dec!(209.98287)),
    ("At", "Astatine", dec!(210.0)),
    ("Rn", "Radon", dec!(222.0)),
    ("Fr", "Francium", dec!(223.0)),
    ("Ra", "Radium", dec!(226.0)),
    ("Ac", "Actinium", dec!(227.0)),
    ("Th", "Thorium", dec!(232.03806)),
    ("Pa", "Protactinium", dec!(231.03588)),
    ("U", "Uranium", dec!(238.05079)),
    ("Np", "Neptunium", dec!(237.0)),
    ("Pu", "Plutonium", dec!(244.0)),
    ("Am", "Americium", dec!(243.0)),
    ("Cm", "Curium", dec!(247.0)),
    ("Bk", "Berkelium", dec!(247.0)),
    ("Cf", "Californium", dec!(251.0)),
    ("Es", "Einsteinium", dec!(252.0)),
    ("Fm", "Fermium", dec!(257.0)),
    ("Md", "Mendelevium", dec!(258.0)),
    ("No", "Nobelium", dec!(259.0)),
    ("Lr", "Lawrencium", dec!(266.0)),
    ("Rf", "Rutherfordium", dec!(267.0)),
    ("Db", "Dubnium", dec!(268.0)),
    ("Sg", "Seaborgium", dec!(269.0)),
    ("Bh", "Bohrium", dec!(270.0)),
    ("Hs", "Hassium", dec!(269.0)),
    ("Mt", "Meitnerium", dec!(278.0)),
    ("Ds", "Darmstadtium", dec!(281.0)),
    ("Rg", "Roentgenium", dec!(282.0)),
    ("Cn", "Copernicium", dec!(285.0)),
    ("Nh", "Nihonium", dec!(286.0)),
    ("Fl", "Flerovium", dec!(289.0)),
    ("Mc", "Moscovium", dec!(289.0)),
    ("Lv", "Livermorium", dec!(293.0)),
    ("Ts", "Tennessine", dec!(294.0)),
    ("Og", "Oganesson", dec!(294.0)),
    // Placeholder names still found in older datasets
    ("Uut", "Ununtrium", dec!(286.0)),
    ("Uup", "Ununpentium", dec!(289.0)),
    ("Uus", "Ununseptium", dec!(294.0)),
    ("Uuo", "Ununoctium", dec!(294.0)),
];

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn default_table_is_valid() {
        let db = AtomicDatabase::default();
        assert_eq!(db.elements.len(), ELEMENTS.len());
        assert_eq!(db.electron_mass(), dec!(0.00054858));
        for (symbol, ElementDescription { mass, isotopes, .. }) in &db.elements {
            assert!(is_element_symbol(symbol), "{symbol}");
            assert!(*mass > Decimal::ZERO, "{symbol}");
            assert!(isotopes.values().all(|&m| m > Decimal::ZERO), "{symbol}");
        }
        let isotope_count: usize = db.elements.values().map(|e| e.isotopes.len()).sum();
        assert_eq!(isotope_count, ISOTOPES.len());
    }

    #[test]
    fn element_lookups() {
        let db = AtomicDatabase::default();
        let carbon = db.element("C").unwrap();
        assert_eq!(carbon.name(), "Carbon");
        assert_eq!(carbon.mass_number(), None);
        assert_eq!(db.element("Uuo").unwrap().name(), "Ununoctium");
        assert_eq!(
            db.element("Xx"),
            Err(AtomicLookupError::Element("Xx".to_owned()))
        );
        // There are no molecular entries, only elements
        assert_eq!(
            db.element("H2"),
            Err(AtomicLookupError::Element("H2".to_owned()))
        );

        let carbon_13 = db.isotope("C", MassNumber::new(13).unwrap()).unwrap();
        assert_eq!(carbon_13.mass_number(), MassNumber::new(13));
        assert!(matches!(
            db.isotope("C", MassNumber::new(15).unwrap()),
            Err(AtomicLookupError::Isotope(..))
        ));
    }

    #[test]
    fn deuterium_is_distinct_from_hydrogen_2() {
        let db = AtomicDatabase::default();
        let deuterium = db.element("D").unwrap();
        let hydrogen_2 = db.isotope("H", MassNumber::new(2).unwrap()).unwrap();
        assert_ne!(deuterium, hydrogen_2);
    }

    #[test]
    fn load_json() {
        let db = AtomicDatabase::from_json(indoc! {r#"
            {
              "electron_mass": "0.0005",
              "elements": [
                { "symbol": "H", "name": "Hydrogen", "mass": "1.0078250321", "isotopes": { "2": "2.01410177811" } },
                { "symbol": "O", "name": "Oxygen", "mass": "15.994915" }
              ]
            }
        "#})
        .unwrap();
        assert_eq!(db.electron_mass(), dec!(0.0005));
        assert_eq!(db.elements.len(), 2);
        assert_eq!(db.elements["H"].isotopes.len(), 1);
        assert!(db.element("C").is_err());

        let default_electron = AtomicDatabase::from_json(r#"{ "elements": [] }"#).unwrap();
        assert_eq!(default_electron.electron_mass(), ELECTRON_MASS);
    }

    #[test]
    fn reject_invalid_json() {
        let load = |json: &str| AtomicDatabase::from_json(json).unwrap_err();
        assert!(matches!(load("{"), AtomicDatabaseError::Json(_)));
        assert!(matches!(
            load(r#"{ "elements": [], "particles": [] }"#),
            AtomicDatabaseError::Json(_)
        ));
        assert!(matches!(
            load(r#"{ "elements": [{ "symbol": "h", "name": "Hydrogen", "mass": "1" }] }"#),
            AtomicDatabaseError::InvalidSymbol(s) if s == "h"
        ));
        assert!(matches!(
            load(r#"{ "elements": [{ "symbol": "HE", "name": "Helium", "mass": "4" }] }"#),
            AtomicDatabaseError::InvalidSymbol(_)
        ));
        assert!(matches!(
            load(indoc! {r#"
                { "elements": [
                    { "symbol": "H", "name": "Hydrogen", "mass": "1" },
                    { "symbol": "H", "name": "Hydrogen", "mass": "1" }
                ] }
            "#}),
            AtomicDatabaseError::DuplicateSymbol(s) if s == "H"
        ));
        assert!(matches!(
            load(r#"{ "elements": [{ "symbol": "H", "name": "Hydrogen", "mass": "0" }] }"#),
            AtomicDatabaseError::NonPositiveMass(..)
        ));
        assert!(matches!(
            load(r#"{ "elements": [{ "symbol": "H", "name": "Hydrogen", "mass": "1", "isotopes": { "0": "1" } }] }"#),
            AtomicDatabaseError::ZeroMassNumber(_)
        ));
        assert!(matches!(
            load(r#"{ "electron_mass": "-1", "elements": [] }"#),
            AtomicDatabaseError::NonPositiveMass(..)
        ));
    }
}
