//! Domain models for the body-composition importer.

mod import;
mod measurement;
mod patient;
mod profile;

pub use import::*;
pub use measurement::*;
pub use patient::*;
pub use profile::*;
