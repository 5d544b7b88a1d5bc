pub(crate) mod adduct;
pub mod errors;
pub(crate) mod formula;
pub mod normalize;
pub(crate) mod primitives;
