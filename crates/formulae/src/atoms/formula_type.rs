use crate::{Element, FormulaType};

impl FormulaType {
    /// Classifies a set of elements by whether they stay within C, H, N, O, P, and S, and whether they contain
    /// chlorine or deuterium
    pub(crate) fn classify<'e, 'a: 'e>(
        elements: impl IntoIterator<Item = &'e Element<'a>>,
    ) -> Self {
        let (mut chlorinated, mut deuterated, mut other) = (false, false, false);
        for element in elements {
            if element.is_deuterium() {
                deuterated = true;
            } else {
                match element.symbol() {
                    "C" | "H" | "N" | "O" | "P" | "S" => (),
                    "Cl" => chlorinated = true,
                    _ => other = true,
                }
            }
        }

        match (other, chlorinated, deuterated) {
            (true, _, false) => Self::All,
            (true, _, true) => Self::AllD,
            (false, false, false) => Self::Chnops,
            (false, true, false) => Self::ChnopsCl,
            (false, false, true) => Self::ChnopsD,
            (false, true, true) => Self::ChnopsClD,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use crate::{AtomicDatabase, MassNumber};

    use super::*;

    static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

    fn classify(symbols: &[&str]) -> FormulaType {
        let elements: Vec<_> = symbols.iter().map(|s| Element::new(&DB, s).unwrap()).collect();
        FormulaType::classify(&elements)
    }

    #[test]
    fn classify_elements() {
        assert_eq!(classify(&["H", "C", "O", "N"]), FormulaType::Chnops);
        assert_eq!(classify(&["H", "C", "O", "N", "Cl"]), FormulaType::ChnopsCl);
        assert_eq!(classify(&["H", "D", "C", "O", "N"]), FormulaType::ChnopsD);
        assert_eq!(classify(&["H", "D", "C", "O", "N", "Cl"]), FormulaType::ChnopsClD);
        assert_eq!(classify(&["H", "C", "O", "N", "Pb"]), FormulaType::All);
        assert_eq!(classify(&["H", "D", "C", "O", "N", "Pb"]), FormulaType::AllD);
        assert_eq!(classify(&[]), FormulaType::Chnops);
    }

    #[test]
    fn isotopes_keep_their_element_class() {
        let hydrogen_2 = Element::new_isotope(&DB, "H", MassNumber::new(2).unwrap()).unwrap();
        let carbon_13 = Element::new_isotope(&DB, "C", MassNumber::new(13).unwrap()).unwrap();
        let chlorine_37 = Element::new_isotope(&DB, "Cl", MassNumber::new(37).unwrap()).unwrap();
        assert_eq!(FormulaType::classify(&[carbon_13]), FormulaType::Chnops);
        assert_eq!(FormulaType::classify(&[carbon_13, hydrogen_2]), FormulaType::ChnopsD);
        assert_eq!(FormulaType::classify(&[chlorine_37, hydrogen_2]), FormulaType::ChnopsClD);
    }

    #[test]
    fn formula_type_display() {
        assert_eq!(FormulaType::Chnops.to_string(), "CHNOPS");
        assert_eq!(FormulaType::ChnopsClD.to_string(), "CHNOPSCLD");
        assert_eq!(FormulaType::AllD.to_string(), "ALLD");
    }
}
