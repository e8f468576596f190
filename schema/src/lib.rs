// RPG Tukuru Schema - Shared type definitions
// This crate contains the record containers, field identifiers and enums that
// describe an RPG Maker 2000 project database. Anything that reads project
// data (the battle engine, tools, the demo binary) goes through these types.

// Re-export the main types
pub use kinds::*;
pub use record::*;

pub mod fields;
pub mod kinds;
pub mod record;
