use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::Count;

impl Count {
    #[must_use]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZeroU32::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.get()).map(Self)
    }

    pub(crate) fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Self)
    }
}

impl Mul<Decimal> for Count {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Decimal::from(self.get()) * rhs
    }
}

impl Display for Count {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let count = self.get();
        if count > 1 {
            write!(f, "{count}")?;
        }
        Ok(())
    }
}

impl Default for Count {
    fn default() -> Self {
        Self(NonZeroU32::MIN)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn zero_is_not_a_count() {
        assert_eq!(Count::new(0), None);
        assert_eq!(Count::new(7).map(Count::get), Some(7));
        assert_eq!(Count::default().get(), 1);
    }

    #[test]
    fn checked_arithmetic() {
        let three = Count::new(3).unwrap();
        let max = Count::new(u32::MAX).unwrap();
        assert_eq!(three.checked_add(three), Count::new(6));
        assert_eq!(three.checked_mul(three), Count::new(9));
        assert_eq!(max.checked_add(three), None);
        assert_eq!(max.checked_mul(three), None);
    }

    #[test]
    fn scale_masses() {
        let two = Count::new(2).unwrap();
        assert_eq!(two * dec!(15.994915), dec!(31.98983));
    }

    #[test]
    fn count_display() {
        assert_eq!(Count::default().to_string(), "");
        assert_eq!(Count::new(12).unwrap().to_string(), "12");
    }
}
