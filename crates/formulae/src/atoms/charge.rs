use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
};

use crate::{Charge, Count, FormulaError, OffsetKind, Result};

impl Charge {
    /// Builds a charge from a legacy sign token (`""`, `"+"`, or `"-"`) and a magnitude
    ///
    /// # Errors
    ///
    /// Fails with [`FormulaError::InvalidCharge`] if the sign is any other token, or if a non-zero magnitude is
    /// given without a sign.
    pub fn from_parts(sign: &str, magnitude: u32) -> Result<Self> {
        match (sign, NonZeroU32::new(magnitude)) {
            ("" | "+" | "-", None) => Ok(Self::Neutral),
            ("+", Some(n)) => Ok(Self::Positive(n)),
            ("-", Some(n)) => Ok(Self::Negative(n)),
            _ => Err(FormulaError::invalid_charge(sign, magnitude).into()),
        }
    }

    pub(crate) const fn from_offset(kind: OffsetKind, count: Count) -> Self {
        match kind {
            OffsetKind::Add => Self::Positive(count.0),
            OffsetKind::Remove => Self::Negative(count.0),
        }
    }

    #[must_use]
    pub const fn magnitude(self) -> u32 {
        match self {
            Self::Neutral => 0,
            Self::Positive(n) | Self::Negative(n) => n.get(),
        }
    }

    #[must_use]
    pub const fn sign(self) -> &'static str {
        match self {
            Self::Neutral => "",
            Self::Positive(_) => "+",
            Self::Negative(_) => "-",
        }
    }

    pub(crate) fn checked_add(self, rhs: Self) -> Result<Self> {
        Self::try_from(i64::from(self) + i64::from(rhs))
    }

    pub(crate) fn checked_sub(self, rhs: Self) -> Result<Self> {
        Self::try_from(i64::from(self) - i64::from(rhs))
    }
}

impl From<Charge> for i64 {
    fn from(value: Charge) -> Self {
        match value {
            Charge::Neutral => 0,
            Charge::Positive(n) => Self::from(n.get()),
            Charge::Negative(n) => -Self::from(n.get()),
        }
    }
}

impl TryFrom<i64> for Charge {
    type Error = Box<FormulaError>;

    fn try_from(value: i64) -> Result<Self> {
        let magnitude = u32::try_from(value.unsigned_abs())
            .map_err(|_| FormulaError::ChargeOverflow { charge: value })?;
        Ok(match NonZeroU32::new(magnitude) {
            None => Self::Neutral,
            Some(n) if value > 0 => Self::Positive(n),
            Some(n) => Self::Negative(n),
        })
    }
}

impl Display for Charge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let magnitude = self.magnitude();
        write!(f, "{}", self.sign())?;
        if magnitude > 1 {
            write!(f, "{magnitude}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sign_tokens() {
        assert_eq!(Charge::from_parts("", 0).unwrap(), Charge::Neutral);
        assert_eq!(Charge::from_parts("+", 0).unwrap(), Charge::Neutral);
        assert_eq!(Charge::from_parts("+", 2).unwrap(), Charge::try_from(2).unwrap());
        assert_eq!(Charge::from_parts("-", 1).unwrap(), Charge::try_from(-1).unwrap());
        // Unknown tokens and unsigned magnitudes are rejected
        for (sign, magnitude) in [("", 1), ("++", 1), ("positive", 2), ("x", 0)] {
            let error = Charge::from_parts(sign, magnitude).unwrap_err();
            assert!(matches!(*error, FormulaError::InvalidCharge { .. }), "{error:?}");
        }
    }

    #[test]
    fn signed_conversions() {
        for signed in [-3, -1, 0, 1, 42] {
            assert_eq!(i64::from(Charge::try_from(signed).unwrap()), signed);
        }
        let error = Charge::try_from(i64::from(u32::MAX) + 1).unwrap_err();
        assert!(matches!(*error, FormulaError::ChargeOverflow { .. }));
    }

    #[test]
    fn charge_arithmetic() {
        let plus_two = Charge::try_from(2).unwrap();
        let minus_one = Charge::try_from(-1).unwrap();
        assert_eq!(i64::from(plus_two.checked_add(minus_one).unwrap()), 1);
        assert_eq!(i64::from(minus_one.checked_sub(plus_two).unwrap()), -3);
        assert_eq!(
            minus_one.checked_add(Charge::Positive(NonZeroU32::MIN)).unwrap(),
            Charge::Neutral
        );
    }

    #[test]
    fn charge_display() {
        let display = |signed| Charge::try_from(signed).unwrap().to_string();
        assert_eq!(display(0), "");
        assert_eq!(display(1), "+");
        assert_eq!(display(-1), "-");
        assert_eq!(display(3), "+3");
        assert_eq!(display(-2), "-2");
    }
}
