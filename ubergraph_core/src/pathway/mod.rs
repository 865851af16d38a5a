//! Module providing the records of a parsed pathway and the PathwayNetwork wrapping them.

pub mod compound;
pub mod gene;
pub mod network;
pub mod reaction;
pub mod relation;

/// Split a space separated list of names or ids into its entries
pub(crate) fn split_names(names: &str) -> impl Iterator<Item = &str> {
    names.split_whitespace()
}
