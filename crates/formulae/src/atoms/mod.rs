pub mod adduct;
pub mod atomic_database;
mod charge;
mod count;
mod element;
pub mod errors;
pub mod formula;
mod formula_type;
mod mass;
mod mass_number;
mod offset_kind;
pub mod tolerance;
