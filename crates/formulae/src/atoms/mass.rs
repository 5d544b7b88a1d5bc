use rust_decimal::Decimal;

use crate::{AtomicDatabase, Charge, ElementCounts, Massive};

/// The monoisotopic mass of `elements` carrying `charge`, reported per unit of charge (m/z) when charged
///
/// Every unit of positive charge costs the molecule one electron, and every unit of negative charge adds one.
pub(crate) fn charged_mass(
    db: &AtomicDatabase,
    elements: &ElementCounts,
    charge: Charge,
) -> Decimal {
    let neutral_mass: Decimal = elements
        .iter()
        .map(|(element, &count)| count * element.monoisotopic_mass())
        .sum();
    let electron_offset = db.electron_mass() * Decimal::from(i64::from(charge));
    let charges = Decimal::from(charge.magnitude().max(1));

    (neutral_mass - electron_offset) / charges
}
