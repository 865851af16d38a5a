//! This module provides the PathwayNetwork struct, wrapping the collections of a parsed pathway
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edges::{EdgeKind, Node, ReactionKey, ReactionRow, ReactionTable};
use crate::pathway::compound::Compound;
use crate::pathway::gene::Gene;
use crate::pathway::reaction::Reaction;
use crate::pathway::relation::{Entry, Relation};

/// A parsed pathway, as handed over by a KGML (or other) reader
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    /// Pathway name (e.g. `path:mtu01200`)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genes: Vec<Gene>,
    #[serde(default)]
    pub compounds: Vec<Compound>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Entries that relations point at
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Read-only view of a pathway with derived lookup lists
#[derive(Clone, Debug)]
pub struct PathwayNetwork {
    /// Name of the pathway
    pub name: String,
    /// Genes, in source order
    genes: Vec<Gene>,
    /// Map of compound ids to compounds, in source order
    compounds: IndexMap<String, Compound>,
    /// Reactions, in source order
    reactions: Vec<Reaction>,
    /// Relations, in source order
    relations: Vec<Relation>,
    /// Map of entry ids to entries
    entries: IndexMap<String, Entry>,
    /// Every synonym of every gene, flattened (duplicates kept)
    gene_list: Vec<String>,
    /// Every synonym of every compound, flattened (duplicates kept)
    compound_list: Vec<String>,
}

impl PathwayNetwork {
    /// Wrap a parsed pathway
    ///
    /// # Parameters
    /// - `pathway`: The parsed pathway
    ///
    /// # Returns
    /// - `Ok`: The network
    /// - `Err`: [`PathwayError::MalformedReaction`] if a reaction has no substrates or no
    ///     products, or [`PathwayError::DuplicateCompound`] if two compounds share an id.
    ///
    /// # Examples
    /// ```rust
    /// use ubergraph_core::pathway::gene::Gene;
    /// use ubergraph_core::pathway::network::{Pathway, PathwayNetwork};
    /// let pathway = Pathway {
    ///     genes: vec![Gene::new("1", "mtu:Rv0001 mtu:Rv0002", "rn:R00001")],
    ///     ..Default::default()
    /// };
    /// let network = PathwayNetwork::new(pathway).unwrap();
    /// assert_eq!(network.gene_list(), &["mtu:Rv0001", "mtu:Rv0002"]);
    /// ```
    pub fn new(pathway: Pathway) -> Result<PathwayNetwork, PathwayError> {
        let mut compounds = IndexMap::new();
        for compound in pathway.compounds {
            if compounds.contains_key(&compound.id) {
                return Err(PathwayError::DuplicateCompound(compound.id));
            }
            compounds.insert(compound.id.clone(), compound);
        }

        for reaction in &pathway.reactions {
            if reaction.substrates.is_empty() || reaction.products.is_empty() {
                return Err(PathwayError::MalformedReaction(reaction.id.clone()));
            }
            // Reactions pointing outside the compound collection are kept as they are
            for id in reaction.substrates.iter().chain(reaction.products.iter()) {
                if !compounds.contains_key(id) {
                    warn!(
                        "Reaction {} references compound {} which is not in the pathway",
                        reaction.id, id
                    );
                }
            }
        }

        let gene_list = pathway
            .genes
            .iter()
            .flat_map(|g| g.names().map(str::to_string))
            .collect();
        let compound_list = compounds
            .values()
            .flat_map(|c| c.names().map(str::to_string))
            .collect();
        let entries = pathway
            .entries
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        debug!(
            "Built network {} with {} genes, {} compounds, {} reactions and {} relations",
            pathway.name,
            pathway.genes.len(),
            compounds.len(),
            pathway.reactions.len(),
            pathway.relations.len()
        );
        Ok(PathwayNetwork {
            name: pathway.name,
            genes: pathway.genes,
            compounds,
            reactions: pathway.reactions,
            relations: pathway.relations,
            entries,
            gene_list,
            compound_list,
        })
    }

    // region Accessors
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.compounds.values()
    }

    pub fn compound(&self, id: &str) -> Option<&Compound> {
        self.compounds.get(id)
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Every gene synonym, one per entry
    pub fn gene_list(&self) -> &[String] {
        &self.gene_list
    }

    /// Every compound synonym, one per entry
    pub fn compound_list(&self) -> &[String] {
        &self.compound_list
    }
    // endregion Accessors

    // region Derived Tables
    /// Edge table with one row per reaction, in reaction order
    pub fn reaction_table(&self) -> ReactionTable {
        self.reactions
            .iter()
            .map(|r| ReactionRow {
                reaction: ReactionKey::Reaction(r.id.clone()),
                substrates: r.substrates.iter().map(|s| Node::compound(s)).collect(),
                products: r.products.iter().map(|p| Node::compound(p)).collect(),
                kind: EdgeKind::Reaction(r.reversibility),
            })
            .collect()
    }

    /// Map of reaction ids to reaction names (a later reaction with the same id wins)
    pub fn reaction_names(&self) -> IndexMap<String, String> {
        self.reactions
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect()
    }

    /// Map of compound ids to compound names
    pub fn compound_names(&self) -> IndexMap<String, String> {
        self.compounds
            .values()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect()
    }

    /// Relation edges together with the names of the entries they connect
    pub fn relation_table(&self) -> Vec<RelationRow> {
        self.relations
            .iter()
            .map(|r| RelationRow {
                entry1: r.entry1.clone(),
                entry2: r.entry2.clone(),
                relation_type: r.relation_type.clone(),
                subtypes: r.subtypes.clone(),
            })
            .collect()
    }

    /// Map of the ids of entries taking part in a relation to their names
    pub fn entry_names(&self) -> IndexMap<String, String> {
        let mut names = IndexMap::new();
        for relation in &self.relations {
            for id in [&relation.entry1, &relation.entry2] {
                let name = self
                    .entries
                    .get(id)
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                names.insert(id.clone(), name);
            }
        }
        names
    }

    /// Map of every entry name synonym back to the id of the entry carrying it
    ///
    /// # Note:
    /// When a synonym is shared by several entries, the last one wins.
    pub fn name_to_entry(&self) -> IndexMap<String, String> {
        let mut reversed = IndexMap::new();
        for (id, name) in self.entry_names() {
            for synonym in name.split_whitespace() {
                reversed.insert(synonym.to_string(), id.clone());
            }
        }
        reversed
    }
    // endregion Derived Tables
}

/// A row of the relation table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelationRow {
    pub entry1: String,
    pub entry2: String,
    #[serde(rename = "rel_type")]
    pub relation_type: String,
    #[serde(rename = "rel_subtype")]
    pub subtypes: Vec<(String, String)>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathwayError {
    #[error("Reaction {0} has no substrates or no products")]
    MalformedReaction(String),
    #[error("Compound id {0} appears more than once")]
    DuplicateCompound(String),
}
