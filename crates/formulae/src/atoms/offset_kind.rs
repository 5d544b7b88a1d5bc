use std::{
    fmt::{self, Display, Formatter},
    ops::Neg,
};

use crate::OffsetKind;

impl OffsetKind {
    pub(crate) fn offset<T: Neg<Output = T>>(self, value: T) -> T {
        match self {
            Self::Add => value,
            Self::Remove => -value,
        }
    }
}

impl Display for OffsetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Remove => "-",
        })
    }
}
