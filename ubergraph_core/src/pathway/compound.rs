//! This module provides the compound struct representing a compound node of a pathway

use std::hash::Hash;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::split_names;

/// Represents a compound
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    /// Used to identify the compound (must be unique within a pathway)
    pub id: String,
    /// Space separated list of synonyms for the compound
    #[builder(default = "String::new()")]
    #[serde(default)]
    pub name: String,
}

impl Compound {
    /// Each synonym of the compound, in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        split_names(&self.name)
    }
}

impl Hash for Compound {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash only depends on id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms() {
        let compound = CompoundBuilder::default()
            .id("17".to_string())
            .name("cpd:C00031 cpd:C00267".to_string())
            .build()
            .unwrap();
        assert_eq!(
            compound.names().collect::<Vec<_>>(),
            vec!["cpd:C00031", "cpd:C00267"]
        );

        let unnamed = CompoundBuilder::default()
            .id("18".to_string())
            .build()
            .unwrap();
        assert_eq!(unnamed.names().count(), 0);
    }
}
