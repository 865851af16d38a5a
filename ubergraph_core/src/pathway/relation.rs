//! This module provides relations between pathway entries (activation, inhibition, expression...)
use serde::{Deserialize, Serialize};

use super::split_names;

/// An entry of the pathway that relations can point at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Used to identify the entry
    pub id: String,
    /// Space separated list of names of the entry
    #[serde(default)]
    pub name: String,
}

impl Entry {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        split_names(&self.name)
    }
}

/// A directed relation between two entries, referenced by entry id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Id of the entry the relation starts at
    pub entry1: String,
    /// Id of the entry the relation points to
    pub entry2: String,
    /// Relation type (e.g. `PPrel`, `GErel`)
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Pairs of (subtype name, subtype value)
    #[serde(default)]
    pub subtypes: Vec<(String, String)>,
}

impl Relation {
    /// Whether any subtype of the relation has the given name (e.g. `activation`)
    pub fn has_subtype(&self, name: &str) -> bool {
        self.subtypes.iter().any(|(n, _)| n == name)
    }
}
