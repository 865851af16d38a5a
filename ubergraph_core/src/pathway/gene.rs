//! This module provides the Gene struct, representing a gene entry of a pathway together with the
//! reactions it catalyzes
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::split_names;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Used to identify the gene entry
    pub id: String,
    /// Space separated list of gene names, each carrying the species prefix (e.g. `mtu:Rv1023`)
    pub name: String,
    /// Space separated list of the ids of reactions this gene is associated with
    #[builder(default = "String::new()")]
    #[serde(default)]
    pub reaction: String,
}

impl Gene {
    pub fn new(id: &str, name: &str, reaction: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: name.to_string(),
            reaction: reaction.to_string(),
        }
    }

    /// Each synonym of the gene, in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        split_names(&self.name)
    }

    /// Ids of the reactions associated with this gene, in source order
    pub fn reaction_ids(&self) -> impl Iterator<Item = &str> {
        split_names(&self.reaction)
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields() {
        let gene = Gene::new("41", "mtu:Rv0001 mtu:Rv0002", "rn:R01070 rn:R01068");
        assert_eq!(
            gene.names().collect::<Vec<_>>(),
            vec!["mtu:Rv0001", "mtu:Rv0002"]
        );
        assert_eq!(
            gene.reaction_ids().collect::<Vec<_>>(),
            vec!["rn:R01070", "rn:R01068"]
        );
        assert_eq!(format!("{}", gene), "41");
    }

    #[test]
    fn builder_defaults() {
        let gene = GeneBuilder::default()
            .id("7".to_string())
            .name("mtu:Rv3456".to_string())
            .build()
            .unwrap();
        assert_eq!(gene.reaction_ids().count(), 0);
        // A name is required
        assert!(GeneBuilder::default().id("8".to_string()).build().is_err());
    }
}
