use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

const ONE_MILLION: Decimal = dec!(1000000);

/// The distance between `reference` and `compare` in parts-per-million of `reference`
///
/// Returns `None` when `reference` is zero, since no relative error can be computed against it, or when the distance
/// is too large to be represented.
#[must_use]
pub fn absolute_to_ppm(reference: Decimal, compare: Decimal) -> Option<Decimal> {
    if reference.is_zero() {
        return None;
    }
    let relative = reference.checked_sub(compare)?.checked_div(reference)?;
    relative.abs().checked_mul(ONE_MILLION)
}

/// The absolute mass difference corresponding to `ppm` parts-per-million of `reference`
///
/// Saturates at [`Decimal::MAX`] (or [`Decimal::MIN`]) rather than overflowing.
#[must_use]
pub fn ppm_to_absolute(reference: Decimal, ppm: Decimal) -> Decimal {
    (reference / ONE_MILLION).saturating_mul(ppm)
}

/// A symmetric mass tolerance, expressed in parts-per-million of the theoretical mass
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct PpmTolerance(Decimal);

impl PpmTolerance {
    pub const DEFAULT_PPM: Decimal = dec!(50);

    #[must_use]
    pub fn new(ppm: Decimal) -> Self {
        Self(ppm.abs())
    }

    #[must_use]
    pub const fn ppm(self) -> Decimal {
        self.0
    }

    /// The largest absolute mass difference from `theoretical` that this tolerance accepts
    #[must_use]
    pub fn window(self, theoretical: Decimal) -> Decimal {
        ppm_to_absolute(theoretical, self.0).abs()
    }

    /// Whether `observed` falls within this tolerance of `theoretical`, including the boundary itself
    ///
    /// A difference too large to be represented is never within tolerance.
    #[must_use]
    pub fn contains(self, theoretical: Decimal, observed: Decimal) -> bool {
        theoretical
            .checked_sub(observed)
            .is_some_and(|difference| difference.abs() <= self.window(theoretical))
    }
}

impl Default for PpmTolerance {
    fn default() -> Self {
        Self(Self::DEFAULT_PPM)
    }
}

impl From<Decimal> for PpmTolerance {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl Display for PpmTolerance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ppm", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_to_ppm_conversion() {
        let ppm = absolute_to_ppm(dec!(18.01056), dec!(18.0110)).unwrap();
        assert_eq!(ppm.round(), dec!(24));
        // The distance is symmetric in sign, but relative to the reference
        assert_eq!(
            absolute_to_ppm(dec!(100), dec!(100.001)),
            absolute_to_ppm(dec!(100), dec!(99.999))
        );
        assert_eq!(absolute_to_ppm(dec!(100), dec!(100.001)), Some(dec!(10)));
        assert_eq!(absolute_to_ppm(Decimal::ZERO, dec!(1)), None);
    }

    #[test]
    fn ppm_to_absolute_conversion() {
        let absolute = ppm_to_absolute(dec!(18.010565), dec!(50));
        assert!((absolute - dec!(0.0009005)).abs() < dec!(0.000001));
        assert_eq!(ppm_to_absolute(dec!(100), dec!(10)), dec!(0.001));
    }

    #[test]
    fn tolerance_boundaries_are_inclusive() {
        let tolerance = PpmTolerance::new(dec!(10));
        assert!(tolerance.contains(dec!(100), dec!(100)));
        assert!(tolerance.contains(dec!(100), dec!(100.001)));
        assert!(tolerance.contains(dec!(100), dec!(99.999)));
        assert!(!tolerance.contains(dec!(100), dec!(100.0010001)));
        assert!(!tolerance.contains(dec!(100), dec!(99.9989999)));
    }

    #[test]
    fn negative_references_have_positive_windows() {
        let tolerance = PpmTolerance::new(dec!(-10));
        assert_eq!(tolerance.ppm(), dec!(10));
        assert_eq!(tolerance.window(dec!(-100)), dec!(0.001));
        assert!(tolerance.contains(dec!(-100), dec!(-100.001)));
    }

    #[test]
    fn extreme_masses() {
        let tolerance = PpmTolerance::new(dec!(10));
        for extreme in [Decimal::MIN, Decimal::MAX] {
            assert!(!tolerance.contains(dec!(18.0105650642), extreme));
            assert!(!tolerance.contains(-extreme, extreme));
            assert_eq!(absolute_to_ppm(-extreme, extreme), None);
        }
        // Tiny references can't be divided into huge distances
        assert_eq!(absolute_to_ppm(dec!(0.0000000000000000000000000001), dec!(1000000000)), None);
        // But a huge reference is still comparable with itself
        assert_eq!(absolute_to_ppm(Decimal::MAX, Decimal::MAX), Some(Decimal::ZERO));
        assert!(tolerance.contains(Decimal::MAX, Decimal::MAX));
        // Windows saturate instead of overflowing
        assert_eq!(ppm_to_absolute(Decimal::MAX, Decimal::MAX), Decimal::MAX);
        assert!(PpmTolerance::new(Decimal::MAX).contains(Decimal::MAX, Decimal::ZERO));
    }

    #[test]
    fn default_tolerance() {
        assert_eq!(PpmTolerance::default().ppm(), dec!(50));
        assert_eq!(PpmTolerance::from(dec!(5)).to_string(), "5 ppm");
    }
}
