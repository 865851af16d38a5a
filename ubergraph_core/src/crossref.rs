//! Cross-references between genes, reactions, and the well-ids of an external measurement
//! platform
//!
//! Gene and reaction naming in pathways is many-to-many: a gene entry carries several synonyms
//! and several reaction ids, and the same synonym can appear on several entries. How colliding
//! keys are combined is chosen explicitly with a [`MergePolicy`].
use std::hash::Hash;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::pathway::network::PathwayNetwork;

// region Merge Policies
/// How a value written under an existing key is combined with the value already there
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The later value replaces the earlier one
    #[default]
    KeepLast,
    /// The earlier value is kept, later ones are dropped
    KeepFirst,
    /// Values are combined (numbers are added, id lists are concatenated)
    Sum,
}

/// Values that can be combined under [`MergePolicy::Sum`]
pub trait Mergeable {
    fn combine(&mut self, other: Self);
}

impl Mergeable for f64 {
    fn combine(&mut self, other: Self) {
        *self += other;
    }
}

/// Lists are concatenated, skipping entries already present
impl<T: PartialEq> Mergeable for Vec<T> {
    fn combine(&mut self, other: Self) {
        for item in other {
            if !self.contains(&item) {
                self.push(item);
            }
        }
    }
}

/// Insert `value` under `key`, resolving a collision with `policy`
pub fn merge_into<K, V>(map: &mut IndexMap<K, V>, key: K, value: V, policy: MergePolicy)
where
    K: Hash + Eq,
    V: Mergeable,
{
    match map.get_mut(&key) {
        None => {
            map.insert(key, value);
        }
        Some(existing) => match policy {
            MergePolicy::KeepLast => *existing = value,
            MergePolicy::KeepFirst => {}
            MergePolicy::Sum => existing.combine(value),
        },
    }
}
// endregion Merge Policies

// region Gene Reaction Maps
/// Map every gene synonym to the ids of the reactions of its gene entry
///
/// # Parameters
/// - `network`: Network whose genes are mapped
/// - `policy`: How a synonym shared by several gene entries is resolved
///     ([`MergePolicy::KeepLast`] drops the earlier entry's reactions)
pub fn genes_to_reactions(
    network: &PathwayNetwork,
    policy: MergePolicy,
) -> IndexMap<String, Vec<String>> {
    let mut map = IndexMap::new();
    for gene in network.genes() {
        let reactions: Vec<String> = gene.reaction_ids().map(str::to_string).collect();
        for name in gene.names() {
            merge_into(&mut map, name.to_string(), reactions.clone(), policy);
        }
    }
    map
}

/// Map every reaction id to the synonyms of the gene entries associated with it
///
/// This is built directly from the gene entries, not by inverting [`genes_to_reactions`], so
/// under [`MergePolicy::KeepLast`] or [`MergePolicy::KeepFirst`] the two maps need not be exact
/// inverses of each other. See [`CrossReference`] for a consistent pair.
pub fn reactions_to_genes(
    network: &PathwayNetwork,
    policy: MergePolicy,
) -> IndexMap<String, Vec<String>> {
    let mut map = IndexMap::new();
    for gene in network.genes() {
        let names: Vec<String> = gene.names().map(str::to_string).collect();
        for reaction in gene.reaction_ids() {
            merge_into(&mut map, reaction.to_string(), names.clone(), policy);
        }
    }
    map
}

/// Invert a map of keys to lists of values
fn invert(map: &IndexMap<String, Vec<String>>) -> IndexMap<String, Vec<String>> {
    let mut inverse: IndexMap<String, Vec<String>> = IndexMap::new();
    for (key, values) in map {
        for value in values {
            let keys = inverse.entry(value.clone()).or_default();
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    inverse
}

/// Bidirectional gene ↔ reaction cross-reference
///
/// The reaction → gene map is the exact inverse of the gene → reaction map: a reaction lists a
/// gene synonym exactly when that synonym lists the reaction.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossReference {
    genes_to_reactions: IndexMap<String, Vec<String>>,
    reactions_to_genes: IndexMap<String, Vec<String>>,
}

impl CrossReference {
    pub fn new(network: &PathwayNetwork, policy: MergePolicy) -> CrossReference {
        let forward = genes_to_reactions(network, policy);
        Self::from_forward(forward)
    }

    /// Same as [`CrossReference::new`], using the configured merge policy
    pub fn from_configuration(network: &PathwayNetwork) -> CrossReference {
        Self::new(network, Configuration::current().merge_policy)
    }

    /// Build from an existing gene synonym → reaction ids map
    pub fn from_forward(genes_to_reactions: IndexMap<String, Vec<String>>) -> CrossReference {
        let reactions_to_genes = invert(&genes_to_reactions);
        CrossReference {
            genes_to_reactions,
            reactions_to_genes,
        }
    }

    pub fn genes_to_reactions(&self) -> &IndexMap<String, Vec<String>> {
        &self.genes_to_reactions
    }

    pub fn reactions_to_genes(&self) -> &IndexMap<String, Vec<String>> {
        &self.reactions_to_genes
    }

    /// Reaction ids of a gene synonym
    pub fn reactions_of(&self, gene: &str) -> Option<&[String]> {
        self.genes_to_reactions.get(gene).map(|r| r.as_slice())
    }

    /// Gene synonyms of a reaction id
    pub fn genes_of(&self, reaction: &str) -> Option<&[String]> {
        self.reactions_to_genes.get(reaction).map(|g| g.as_slice())
    }

    /// Check whether `reactions_to_genes` is the exact inverse of the forward map
    ///
    /// Always true for a cross-reference built with [`CrossReference::new`]; useful to compare
    /// against a map produced by [`reactions_to_genes`].
    pub fn is_exact_inverse(&self, reactions_to_genes: &IndexMap<String, Vec<String>>) -> bool {
        let expected = invert(&self.genes_to_reactions);
        expected.len() == reactions_to_genes.len()
            && expected.iter().all(|(reaction, genes)| {
                reactions_to_genes.get(reaction).is_some_and(|other| {
                    other.len() == genes.len() && genes.iter().all(|g| other.contains(g))
                })
            })
    }

    /// Well-ids of the network genes found in the lookup table
    ///
    /// # Parameters
    /// - `lookup`: Table of well-ids to gene names (without species prefix)
    /// - `species_prefix`: Prefix carried by gene names in the network, stripped before lookup
    ///
    /// # Returns
    /// The well-ids in the order of the gene synonyms. Genes absent from the lookup table are
    /// skipped.
    pub fn well_ids_for_network_genes(
        &self,
        lookup: &GeneLookupTable,
        species_prefix: &str,
    ) -> Vec<String> {
        self.network_gene_wells(lookup, species_prefix)
            .into_iter()
            .map(|(_, well_id)| well_id)
            .collect()
    }

    /// Pairs of (network gene synonym, well-id) for the genes found in the lookup table
    pub fn network_gene_wells(
        &self,
        lookup: &GeneLookupTable,
        species_prefix: &str,
    ) -> Vec<(String, String)> {
        let mut wells = Vec::new();
        for gene in self.genes_to_reactions.keys() {
            let bare = strip_species_prefix(gene, species_prefix);
            match lookup.well_id_for_gene(bare) {
                Some(well_id) => wells.push((gene.clone(), well_id.to_string())),
                None => debug!("Gene {} has no well-id in the lookup table", gene),
            }
        }
        wells
    }
}

/// Strip the species prefix from a gene name, names without it are returned unchanged
pub fn strip_species_prefix<'a>(gene: &'a str, species_prefix: &str) -> &'a str {
    gene.strip_prefix(species_prefix).unwrap_or(gene)
}
// endregion Gene Reaction Maps

// region Lookup Table
/// A row of the well-id lookup table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookupRow {
    pub well_id: String,
    /// Gene name without species prefix
    pub gene_name: String,
}

/// Table relating the well-ids of a measurement platform to gene names
///
/// Lookups return the first matching row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneLookupTable {
    rows: Vec<LookupRow>,
}

impl GeneLookupTable {
    pub fn new(rows: Vec<LookupRow>) -> Self {
        GeneLookupTable { rows }
    }

    pub fn push(&mut self, well_id: &str, gene_name: &str) {
        self.rows.push(LookupRow {
            well_id: well_id.to_string(),
            gene_name: gene_name.to_string(),
        });
    }

    pub fn rows(&self) -> &[LookupRow] {
        &self.rows
    }

    pub fn well_id_for_gene(&self, gene_name: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.gene_name == gene_name)
            .map(|r| r.well_id.as_str())
    }

    pub fn gene_for_well_id(&self, well_id: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.well_id == well_id)
            .map(|r| r.gene_name.as_str())
    }
}

impl FromIterator<(String, String)> for GeneLookupTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        GeneLookupTable {
            rows: iter
                .into_iter()
                .map(|(well_id, gene_name)| LookupRow { well_id, gene_name })
                .collect(),
        }
    }
}
// endregion Lookup Table

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::gene::Gene;
    use crate::pathway::network::Pathway;

    fn setup_network() -> PathwayNetwork {
        PathwayNetwork::new(Pathway {
            genes: vec![
                Gene::new("1", "mtu:Rv0001 mtu:Rv0002", "rn:R1 rn:R2"),
                Gene::new("2", "mtu:Rv0003", "rn:R2"),
                Gene::new("3", "mtu:Rv0001", "rn:R3"),
            ],
            ..Default::default()
        })
        .unwrap()
    }

    fn setup_lookup() -> GeneLookupTable {
        let mut lookup = GeneLookupTable::default();
        lookup.push("W1", "Rv0001");
        lookup.push("W3", "Rv0003");
        lookup.push("W9", "Rv9999");
        lookup
    }

    #[test]
    fn merge_policies() {
        let mut map: IndexMap<String, f64> = IndexMap::new();
        merge_into(&mut map, "a".to_string(), 1.0, MergePolicy::KeepLast);
        merge_into(&mut map, "a".to_string(), 2.0, MergePolicy::KeepLast);
        assert!((map["a"] - 2.0).abs() < 1e-12);
        merge_into(&mut map, "a".to_string(), 5.0, MergePolicy::KeepFirst);
        assert!((map["a"] - 2.0).abs() < 1e-12);
        merge_into(&mut map, "a".to_string(), 5.0, MergePolicy::Sum);
        assert!((map["a"] - 7.0).abs() < 1e-12);

        let mut lists: IndexMap<&str, Vec<&str>> = IndexMap::new();
        merge_into(&mut lists, "g", vec!["R1", "R2"], MergePolicy::Sum);
        merge_into(&mut lists, "g", vec!["R2", "R3"], MergePolicy::Sum);
        assert_eq!(lists["g"], vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn genes_to_reactions_keep_last() {
        let network = setup_network();
        let map = genes_to_reactions(&network, MergePolicy::KeepLast);
        // mtu:Rv0001 appears on entries 1 and 3, entry 3 wins
        assert_eq!(map["mtu:Rv0001"], vec!["rn:R3"]);
        assert_eq!(map["mtu:Rv0002"], vec!["rn:R1", "rn:R2"]);
        assert_eq!(map["mtu:Rv0003"], vec!["rn:R2"]);
        // Insertion order of keys follows the first appearance
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["mtu:Rv0001", "mtu:Rv0002", "mtu:Rv0003"]
        );

        let first = genes_to_reactions(&network, MergePolicy::KeepFirst);
        assert_eq!(first["mtu:Rv0001"], vec!["rn:R1", "rn:R2"]);
        let summed = genes_to_reactions(&network, MergePolicy::Sum);
        assert_eq!(summed["mtu:Rv0001"], vec!["rn:R1", "rn:R2", "rn:R3"]);
    }

    #[test]
    fn reaction_maps_consistency() {
        let network = setup_network();
        let independent = reactions_to_genes(&network, MergePolicy::KeepLast);
        // rn:R2 is listed by entries 1 and 2, entry 2 wins
        assert_eq!(independent["rn:R2"], vec!["mtu:Rv0003"]);

        let crossref = CrossReference::new(&network, MergePolicy::KeepLast);
        // The inverted map keeps every synonym still pointing at rn:R2
        assert_eq!(
            crossref.genes_of("rn:R2").unwrap(),
            &["mtu:Rv0002", "mtu:Rv0003"]
        );
        // mtu:Rv0001 lost rn:R1 to entry 3, so rn:R1 only lists mtu:Rv0002
        assert_eq!(crossref.genes_of("rn:R1").unwrap(), &["mtu:Rv0002"]);
        assert!(crossref.is_exact_inverse(crossref.reactions_to_genes()));
        assert!(!crossref.is_exact_inverse(&independent));

        for (gene, reactions) in crossref.genes_to_reactions() {
            for reaction in reactions {
                assert!(crossref.genes_of(reaction).unwrap().contains(gene));
            }
        }
    }

    #[test]
    fn well_ids() {
        let network = setup_network();
        let crossref = CrossReference::new(&network, MergePolicy::KeepLast);
        let lookup = setup_lookup();
        // mtu:Rv0002 is not in the lookup table and is skipped
        assert_eq!(
            crossref.well_ids_for_network_genes(&lookup, "mtu:"),
            vec!["W1", "W3"]
        );
        assert_eq!(
            crossref.network_gene_wells(&lookup, "mtu:")[1],
            ("mtu:Rv0003".to_string(), "W3".to_string())
        );
        assert_eq!(lookup.gene_for_well_id("W9"), Some("Rv9999"));
        assert_eq!(lookup.well_id_for_gene("Rv0002"), None);
    }

    #[test]
    fn prefix_stripping() {
        assert_eq!(strip_species_prefix("mtu:Rv0001", "mtu:"), "Rv0001");
        assert_eq!(strip_species_prefix("Rv0001", "mtu:"), "Rv0001");
    }
}
