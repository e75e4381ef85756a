pub mod category;
pub mod clean;
/// The declarative channel layout and helpers for applying it.
pub mod layout;
pub mod protect;
pub mod setup;
