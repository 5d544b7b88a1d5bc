use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

use crate::{Element, MassNumber, Massive, Result};

use super::{
    atomic_database::{AtomicDatabase, ElementDescription},
    errors::AtomicLookupError,
};

impl<'a> Element<'a> {
    /// # Errors
    ///
    /// Fails with [`AtomicLookupError::Element`] if `symbol` is not in the database.
    pub fn new(db: &'a AtomicDatabase, symbol: impl AsRef<str>) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, None)
    }

    /// # Errors
    ///
    /// Fails if the element is missing, or if the element has no isotope with the given mass number.
    pub fn new_isotope(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: impl Into<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        Self::lookup(db, symbol, Some(mass_number.into()))
    }

    fn lookup(
        db: &'a AtomicDatabase,
        symbol: impl AsRef<str>,
        mass_number: Option<MassNumber>,
    ) -> Result<Self, AtomicLookupError> {
        let symbol = symbol.as_ref();
        let (
            symbol,
            ElementDescription {
                name,
                mass,
                isotopes,
            },
        ) = db
            .elements
            .get_key_value(symbol)
            .ok_or_else(|| AtomicLookupError::element(symbol))?;

        let mass = match mass_number {
            Some(mass_number) => *isotopes.get(&mass_number).ok_or_else(|| {
                AtomicLookupError::isotope(symbol, mass_number, isotopes.keys().copied())
            })?,
            None => *mass,
        };

        Ok(Self {
            symbol,
            name,
            mass_number,
            mass,
        })
    }

    #[must_use]
    pub const fn symbol(&self) -> &'a str {
        self.symbol
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub const fn mass_number(&self) -> Option<MassNumber> {
        self.mass_number
    }

    pub(crate) fn is_deuterium(&self) -> bool {
        self.symbol == "D"
            || (self.symbol == "H" && self.mass_number.map(MassNumber::get) == Some(2))
    }
}

impl Display for Element<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol;
        if let Some(mass_number) = self.mass_number {
            write!(f, "[{mass_number}]{symbol}")
        } else {
            write!(f, "{symbol}")
        }
    }
}

impl Massive for Element<'_> {
    fn monoisotopic_mass(&self) -> Decimal {
        self.mass
    }
}
