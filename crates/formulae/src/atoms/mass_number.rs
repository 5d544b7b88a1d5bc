use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
};

use crate::{Count, MassNumber};

impl MassNumber {
    #[must_use]
    pub const fn new(mass_number: u32) -> Option<Self> {
        match NonZeroU32::new(mass_number) {
            Some(mass_number) => Some(Self(mass_number)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl From<Count> for MassNumber {
    fn from(value: Count) -> Self {
        Self(value.0)
    }
}

impl Display for MassNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
