//! Pathway-level perturbation scores
use log::debug;
use serde::Serialize;

use crate::configuration::Configuration;
use crate::crossref::{strip_species_prefix, GeneLookupTable};
use crate::pathway::network::PathwayNetwork;
use crate::perturbation::{significant, PerturbationError, PerturbationTable};

/// L1 score of a treatment combination on a pathway
///
/// Every gene synonym of the network is mapped to its well-id, each well's significant values
/// are summed over `drug_combo`, and the absolute row sums are added up. Values below the
/// significance threshold and missing cells contribute nothing. Synonyms without a well-id and
/// wells absent from the table are skipped.
///
/// # Parameters
/// - `table`: Perturbation measurements
/// - `lookup`: Well-id ↔ gene name table
/// - `network`: Pathway whose genes are scored
/// - `drug_combo`: Treatment column indices
/// - `species_prefix`: Prefix of the network gene names
/// - `threshold`: Significance threshold
///
/// # Returns
/// The score, or [`PerturbationError::TreatmentOutOfRange`] for a bad treatment index
pub fn l1_score(
    table: &PerturbationTable,
    lookup: &GeneLookupTable,
    network: &PathwayNetwork,
    drug_combo: &[usize],
    species_prefix: &str,
    threshold: f64,
) -> Result<f64, PerturbationError> {
    let mut score = 0.0;
    for gene in network.gene_list() {
        let gene_name = strip_species_prefix(gene, species_prefix);
        let Some(well_id) = lookup.well_id_for_gene(gene_name) else {
            continue;
        };
        if !table.contains_well(well_id) {
            debug!("Well {} of gene {} has no measurements", well_id, gene);
            continue;
        }
        let mut row_sum = 0.0;
        for &treatment in drug_combo {
            if let Some(value) = table.value(well_id, treatment)? {
                if significant(value, threshold) {
                    row_sum += value;
                }
            }
        }
        score += f64::abs(row_sum);
    }
    Ok(score)
}

/// [`l1_score`] with the species prefix and significance threshold of the global
/// [`Configuration`]
pub fn configured_l1_score(
    table: &PerturbationTable,
    lookup: &GeneLookupTable,
    network: &PathwayNetwork,
    drug_combo: &[usize],
) -> Result<f64, PerturbationError> {
    let config = Configuration::current();
    l1_score(
        table,
        lookup,
        network,
        drug_combo,
        &config.species_prefix,
        config.significance_threshold,
    )
}

/// Up and down regulation of a set of wells under one treatment
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RegulationSummary {
    pub treatment: String,
    /// Sum of the positive values
    pub up: f64,
    /// Sum of the negative values
    pub down: f64,
    /// Sum of the absolute values
    pub total: f64,
    /// Sum of the values at or above the threshold
    pub sig_up: f64,
    /// Sum of the values at or below the negated threshold
    pub sig_down: f64,
    /// `sig_up + |sig_down|`
    pub sig_total: f64,
}

/// Summarise the regulation of the given wells, one summary per treatment column
///
/// Wells missing from the table are skipped, missing cells count as zero.
pub fn regulation_summary(
    table: &PerturbationTable,
    well_ids: &[&str],
    threshold: f64,
) -> Vec<RegulationSummary> {
    let mut summaries: Vec<RegulationSummary> = table
        .treatments()
        .iter()
        .map(|t| RegulationSummary {
            treatment: t.clone(),
            ..Default::default()
        })
        .collect();
    for well_id in well_ids {
        let Ok(row) = table.row(well_id) else {
            debug!("Well {} has no measurements", well_id);
            continue;
        };
        for (summary, value) in summaries.iter_mut().zip(row) {
            let Some(value) = *value else { continue };
            if value > 0.0 {
                summary.up += value;
            } else {
                summary.down += value;
            }
            summary.total += value.abs();
            if value >= threshold {
                summary.sig_up += value;
            } else if value <= -threshold {
                summary.sig_down += value;
            }
        }
    }
    for summary in &mut summaries {
        summary.sig_total = summary.sig_up + summary.sig_down.abs();
    }
    summaries
}

/// [`regulation_summary`] with the significance threshold of the global [`Configuration`]
pub fn configured_regulation_summary(
    table: &PerturbationTable,
    well_ids: &[&str],
) -> Vec<RegulationSummary> {
    regulation_summary(table, well_ids, Configuration::current().significance_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::gene::Gene;
    use crate::pathway::network::Pathway;

    fn setup_table() -> PerturbationTable {
        let mut table = PerturbationTable::new(vec![
            "PZA".to_string(),
            "EMB".to_string(),
            "RIF".to_string(),
        ]);
        table
            .add_row("W1", vec![Some(1.5), Some(-2.0), Some(0.5)])
            .unwrap();
        table
            .add_row("W2", vec![Some(-1.0), None, Some(3.0)])
            .unwrap();
        table
            .add_row("W3", vec![Some(0.25), Some(-0.5), Some(-1.0)])
            .unwrap();
        table
    }

    fn setup_lookup() -> GeneLookupTable {
        let mut lookup = GeneLookupTable::default();
        lookup.push("W1", "gA");
        lookup.push("W2", "gB");
        lookup.push("W3", "gC");
        lookup.push("W8", "gD");
        lookup
    }

    #[test]
    fn l1_scores() {
        let network = PathwayNetwork::new(Pathway {
            genes: vec![
                Gene::new("1", "mtu:gA mtu:gB", "R1"),
                Gene::new("2", "mtu:gD mtu:gZ", "R2"),
            ],
            ..Default::default()
        })
        .unwrap();
        let table = setup_table();
        let lookup = setup_lookup();

        // W1: 1.5 - 2.0 = -0.5, W2: -1.0 + missing = -1.0; gD has no row and gZ no well
        let score = l1_score(&table, &lookup, &network, &[0, 1], "mtu:", 1.0).unwrap();
        assert!((score - 1.5).abs() < 1e-12);

        // 0.5 is not significant
        let score = l1_score(&table, &lookup, &network, &[2], "mtu:", 1.0).unwrap();
        assert!((score - 3.0).abs() < 1e-12);

        assert_eq!(
            l1_score(&table, &lookup, &network, &[4], "mtu:", 1.0).unwrap_err(),
            PerturbationError::TreatmentOutOfRange(4)
        );
    }

    #[test]
    fn regulation_summaries() {
        let table = setup_table();
        let summaries = regulation_summary(&table, &["W1", "W2", "W3", "W9"], 1.0);
        assert_eq!(summaries.len(), 3);

        let pza = &summaries[0];
        assert_eq!(pza.treatment, "PZA");
        assert!((pza.up - 1.75).abs() < 1e-12);
        assert!((pza.down + 1.0).abs() < 1e-12);
        assert!((pza.total - 2.75).abs() < 1e-12);
        assert!((pza.sig_up - 1.5).abs() < 1e-12);
        assert!((pza.sig_down + 1.0).abs() < 1e-12);
        assert!((pza.sig_total - 2.5).abs() < 1e-12);

        let rif = &summaries[2];
        assert!((rif.up - 3.5).abs() < 1e-12);
        assert!((rif.sig_up - 3.0).abs() < 1e-12);
        assert!((rif.sig_total - 4.0).abs() < 1e-12);
    }
}
