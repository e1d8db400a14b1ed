//! Schema structure module

mod builder;
mod structure;

pub use builder::{StructureBuilder, TableBuilder};
pub use structure::{Column, ForeignKey, Structure, Table};
