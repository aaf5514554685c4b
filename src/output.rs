//! Terminal output

pub mod human;

pub use human::HumanReporter;
