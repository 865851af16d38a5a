//! Determination of uber edges: reactions whose genes respond to a treatment combination
//!
//! Perturbation values of each network gene's well are summed over the chosen treatments, and the
//! resulting effect is written onto every reaction the gene maps to. A reaction is an uber edge
//! exactly when it received an effect.
use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::crossref::{merge_into, CrossReference, GeneLookupTable, MergePolicy};
use crate::edges::{ExpandedTable, ReactionKey, ReactionTable};
use crate::perturbation::{PerturbationError, PerturbationTable};

/// Computes perturbation effects for the reactions of a network
#[derive(Clone, Debug)]
pub struct UberedgeDetermination<'a> {
    crossref: &'a CrossReference,
    lookup: &'a GeneLookupTable,
    perturbations: &'a PerturbationTable,
    /// Pairs of (network gene synonym, well-id), for network genes found in the lookup table
    gene_wells: Vec<(String, String)>,
}

impl<'a> UberedgeDetermination<'a> {
    /// # Parameters
    /// - `crossref`: Gene ↔ reaction cross-reference of the network
    /// - `lookup`: Well-id ↔ gene name table of the measurement platform
    /// - `perturbations`: Measured expression changes, keyed by well-id
    /// - `species_prefix`: Prefix of network gene names missing from the lookup table
    pub fn new(
        crossref: &'a CrossReference,
        lookup: &'a GeneLookupTable,
        perturbations: &'a PerturbationTable,
        species_prefix: &str,
    ) -> Self {
        let gene_wells = crossref.network_gene_wells(lookup, species_prefix);
        debug!(
            "{} of {} network genes have a well-id",
            gene_wells.len(),
            crossref.genes_to_reactions().len()
        );
        UberedgeDetermination {
            crossref,
            lookup,
            perturbations,
            gene_wells,
        }
    }

    /// Same as [`UberedgeDetermination::new`], using the configured species prefix
    pub fn from_configuration(
        crossref: &'a CrossReference,
        lookup: &'a GeneLookupTable,
        perturbations: &'a PerturbationTable,
    ) -> Self {
        let prefix = Configuration::current().species_prefix;
        Self::new(crossref, lookup, perturbations, &prefix)
    }

    /// Well-ids of the network genes, in gene order
    pub fn well_ids(&self) -> Vec<&str> {
        self.gene_wells.iter().map(|(_, w)| w.as_str()).collect()
    }

    /// Effect of the treatment combination on every network gene with a well-id
    ///
    /// # Parameters
    /// - `drug_combo`: Treatment column indices of the perturbation table
    ///
    /// # Returns
    /// - `Ok`: Map of gene names (as in the lookup table) to the sum of their well's values over
    ///     `drug_combo`
    /// - `Err`: If a well-id is missing from the perturbation table, or a treatment index is out
    ///     of range
    pub fn gene_effects(
        &self,
        drug_combo: &[usize],
    ) -> Result<IndexMap<String, f64>, UberedgeError> {
        let mut effects = IndexMap::new();
        for (gene, well_id) in &self.gene_wells {
            let effect = self.perturbations.combo_sum(well_id, drug_combo)?;
            let name = self
                .lookup
                .gene_for_well_id(well_id)
                .unwrap_or(gene.as_str());
            effects.insert(name.to_string(), effect);
        }
        Ok(effects)
    }

    /// Effect of the treatment combination on every reaction
    ///
    /// # Parameters
    /// - `drug_combo`: Treatment column indices of the perturbation table
    /// - `policy`: How effects of several genes mapping to the same reaction are combined.
    ///     [`MergePolicy::KeepLast`] keeps the effect of the last gene, [`MergePolicy::Sum`] adds
    ///     them up.
    ///
    /// # Returns
    /// The annotation of reaction ids with their effect, reactions without a measured gene are
    /// absent. Fails like [`UberedgeDetermination::gene_effects`].
    pub fn reaction_effects(
        &self,
        drug_combo: &[usize],
        policy: MergePolicy,
    ) -> Result<UberedgeAnnotation, UberedgeError> {
        let mut effects = IndexMap::new();
        for (gene, well_id) in &self.gene_wells {
            let effect = self.perturbations.combo_sum(well_id, drug_combo)?;
            for reaction in self.crossref.reactions_of(gene).unwrap_or_default() {
                merge_into(&mut effects, reaction.clone(), effect, policy);
            }
        }
        info!(
            "Treatment combination {:?} marks {} reactions as uber edges",
            drug_combo,
            effects.len()
        );
        Ok(UberedgeAnnotation { effects })
    }
}

/// Map of reaction ids to the perturbation effect of their genes
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UberedgeAnnotation {
    effects: IndexMap<String, f64>,
}

impl UberedgeAnnotation {
    pub fn new(effects: IndexMap<String, f64>) -> Self {
        UberedgeAnnotation { effects }
    }

    pub fn effects(&self) -> &IndexMap<String, f64> {
        &self.effects
    }

    pub fn effect(&self, reaction_id: &str) -> Option<f64> {
        self.effects.get(reaction_id).copied()
    }

    /// A reaction is an uber edge when it has an effect, pseudo-reactions never are
    pub fn is_uber(&self, reaction: &ReactionKey) -> bool {
        reaction
            .as_reaction()
            .is_some_and(|id| self.effects.contains_key(id))
    }

    /// Flux weight of a reaction: its effect for uber edges, 1 otherwise
    pub fn weight(&self, reaction: &ReactionKey) -> f64 {
        reaction
            .as_reaction()
            .and_then(|id| self.effect(id))
            .unwrap_or(1.0)
    }

    /// The is-uber column of an expanded edge table
    pub fn annotate(&self, table: &ExpandedTable) -> Vec<bool> {
        table.edges.iter().map(|e| self.is_uber(&e.reaction)).collect()
    }

    /// The is-uber column of a reaction table
    pub fn annotate_rows(&self, table: &ReactionTable) -> Vec<bool> {
        table.iter().map(|r| self.is_uber(&r.reaction)).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UberedgeError {
    #[error("Unable to compute the effect of a gene")]
    Perturbation(#[from] PerturbationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::{Node, ReactionRow};
    use crate::expansion::expand;
    use crate::pathway::gene::Gene;
    use crate::pathway::network::{Pathway, PathwayNetwork};
    use crate::pathway::reaction::Reversibility;

    fn setup_network() -> PathwayNetwork {
        PathwayNetwork::new(Pathway {
            genes: vec![
                Gene::new("1", "mtu:gA", "R1 R2"),
                Gene::new("2", "mtu:gB", "R2 R3"),
                Gene::new("3", "mtu:gC", "R4"),
            ],
            ..Default::default()
        })
        .unwrap()
    }

    fn setup_lookup() -> GeneLookupTable {
        let mut lookup = GeneLookupTable::default();
        lookup.push("W1", "gA");
        lookup.push("W2", "gB");
        lookup
    }

    fn setup_perturbations() -> PerturbationTable {
        let mut table = PerturbationTable::new(vec![
            "PZA".to_string(),
            "EMB".to_string(),
            "RIF".to_string(),
        ]);
        table
            .add_row("W1", vec![Some(1.5), Some(2.0), Some(1.5)])
            .unwrap();
        table
            .add_row("W2", vec![Some(-1.0), Some(0.5), None])
            .unwrap();
        table
    }

    #[test]
    fn gene_to_reaction_effects() {
        let network = PathwayNetwork::new(Pathway {
            genes: vec![Gene::new("1", "mtu:gA", "R1 R2")],
            ..Default::default()
        })
        .unwrap();
        let crossref = CrossReference::new(&network, MergePolicy::KeepLast);
        let lookup = setup_lookup();
        let perturbations = setup_perturbations();
        let determination = UberedgeDetermination::new(&crossref, &lookup, &perturbations, "mtu:");

        let annotation = determination
            .reaction_effects(&[0, 1, 2], MergePolicy::KeepLast)
            .unwrap();
        assert_eq!(annotation.len(), 2);
        assert!((annotation.effect("R1").unwrap() - 5.0).abs() < 1e-12);
        assert!((annotation.effect("R2").unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn collisions() {
        let network = setup_network();
        let crossref = CrossReference::new(&network, MergePolicy::KeepLast);
        let lookup = setup_lookup();
        let perturbations = setup_perturbations();
        let determination = UberedgeDetermination::new(&crossref, &lookup, &perturbations, "mtu:");
        assert_eq!(determination.well_ids(), vec!["W1", "W2"]);

        let genes = determination.gene_effects(&[0, 1]).unwrap();
        assert!((genes["gA"] - 3.5).abs() < 1e-12);
        assert!((genes["gB"] + 0.5).abs() < 1e-12);

        // R2 belongs to gA and gB, the later gene wins
        let last = determination
            .reaction_effects(&[0, 1], MergePolicy::KeepLast)
            .unwrap();
        assert!((last.effect("R2").unwrap() + 0.5).abs() < 1e-12);
        let summed = determination
            .reaction_effects(&[0, 1], MergePolicy::Sum)
            .unwrap();
        assert!((summed.effect("R2").unwrap() - 3.0).abs() < 1e-12);
        let first = determination
            .reaction_effects(&[0, 1], MergePolicy::KeepFirst)
            .unwrap();
        assert!((first.effect("R2").unwrap() - 3.5).abs() < 1e-12);

        // gC has no well, so R4 is not an uber edge
        assert_eq!(last.effect("R4"), None);
        assert_eq!(
            last.effects().keys().collect::<Vec<_>>(),
            vec!["R1", "R2", "R3"]
        );
    }

    #[test]
    fn missing_well_is_an_error() {
        let network = setup_network();
        let crossref = CrossReference::new(&network, MergePolicy::KeepLast);
        let mut lookup = setup_lookup();
        lookup.push("W5", "gC");
        let perturbations = setup_perturbations();
        let determination = UberedgeDetermination::new(&crossref, &lookup, &perturbations, "mtu:");
        assert_eq!(
            determination
                .reaction_effects(&[0], MergePolicy::KeepLast)
                .unwrap_err(),
            UberedgeError::Perturbation(PerturbationError::UnknownWell("W5".to_string()))
        );
        assert!(determination.gene_effects(&[0]).is_err());
    }

    #[test]
    fn weights_and_flags() {
        let mut effects = IndexMap::new();
        effects.insert("R1".to_string(), 2.5);
        let annotation = UberedgeAnnotation::new(effects);
        let r1 = ReactionKey::Reaction("R1".to_string());
        let r2 = ReactionKey::Reaction("R2".to_string());
        assert!(annotation.is_uber(&r1));
        assert!(!annotation.is_uber(&r2));
        assert!(!annotation.is_uber(&ReactionKey::Source));
        assert!((annotation.weight(&r1) - 2.5).abs() < 1e-12);
        assert!((annotation.weight(&r2) - 1.0).abs() < 1e-12);
        assert!((annotation.weight(&ReactionKey::Sink) - 1.0).abs() < 1e-12);

        let table = ReactionTable::from(vec![
            ReactionRow::reaction("R1", &["1", "2"], &["3"], Reversibility::Irreversible),
            ReactionRow::reaction("R2", &["3"], &["4"], Reversibility::Reversible),
            ReactionRow::sink(Node::compound("4")),
        ]);
        assert_eq!(annotation.annotate_rows(&table), vec![true, false, false]);
        let expanded = expand(&table).unwrap();
        assert_eq!(
            annotation.annotate(&expanded),
            vec![true, true, true, true, false, false, false]
        );
    }
}
