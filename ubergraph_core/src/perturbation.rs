//! Tables of measured expression changes under a set of treatments (drugs, doses, ...)
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expression change magnitudes, one row per well-id and one column per treatment
///
/// Cells may be missing (`None`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerturbationTable {
    /// Names of the treatment columns
    treatments: Vec<String>,
    /// Map of well-ids to one value per treatment
    rows: IndexMap<String, Vec<Option<f64>>>,
}

impl PerturbationTable {
    /// Create an empty table with the given treatment columns
    pub fn new(treatments: Vec<String>) -> Self {
        PerturbationTable {
            treatments,
            rows: IndexMap::new(),
        }
    }

    /// Add (or replace) the row of a well
    ///
    /// # Returns
    /// [`PerturbationError::RowLength`] if `values` does not have one entry per treatment
    pub fn add_row(
        &mut self,
        well_id: &str,
        values: Vec<Option<f64>>,
    ) -> Result<(), PerturbationError> {
        if values.len() != self.treatments.len() {
            return Err(PerturbationError::RowLength {
                well_id: well_id.to_string(),
                expected: self.treatments.len(),
                found: values.len(),
            });
        }
        self.rows.insert(well_id.to_string(), values);
        Ok(())
    }

    pub fn treatments(&self) -> &[String] {
        &self.treatments
    }

    /// Index of a treatment column by name
    pub fn treatment_index(&self, treatment: &str) -> Option<usize> {
        self.treatments.iter().position(|t| t == treatment)
    }

    pub fn well_ids(&self) -> impl Iterator<Item = &String> {
        self.rows.keys()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_well(&self, well_id: &str) -> bool {
        self.rows.contains_key(well_id)
    }

    pub fn row(&self, well_id: &str) -> Result<&[Option<f64>], PerturbationError> {
        self.rows
            .get(well_id)
            .map(|r| r.as_slice())
            .ok_or_else(|| PerturbationError::UnknownWell(well_id.to_string()))
    }

    /// Value of one cell, `Ok(None)` when the cell is missing
    pub fn value(&self, well_id: &str, treatment: usize) -> Result<Option<f64>, PerturbationError> {
        let row = self.row(well_id)?;
        row.get(treatment)
            .copied()
            .ok_or(PerturbationError::TreatmentOutOfRange(treatment))
    }

    /// Sum of a well's values over a combination of treatment columns
    ///
    /// # Parameters
    /// - `well_id`: Row to sum
    /// - `drug_combo`: Treatment column indices (0 is the first treatment)
    ///
    /// # Returns
    /// The sum, missing cells count as zero. Fails with [`PerturbationError::UnknownWell`] or
    /// [`PerturbationError::TreatmentOutOfRange`].
    pub fn combo_sum(&self, well_id: &str, drug_combo: &[usize]) -> Result<f64, PerturbationError> {
        let row = self.row(well_id)?;
        let mut total = 0.0;
        for &treatment in drug_combo {
            match row.get(treatment) {
                Some(Some(value)) => total += value,
                Some(None) => {}
                None => return Err(PerturbationError::TreatmentOutOfRange(treatment)),
            }
        }
        Ok(total)
    }

    /// Collate replicate measurements into a table of per-treatment means
    ///
    /// # Parameters
    /// - `sheets`: Map of treatment names to their replicate sheets
    ///
    /// # Returns
    /// A table with one `{treatment}_avg` column per sheet. Rows are the union of the well-ids of
    /// all sheets (in order of first appearance). A cell holds the mean of the non-missing
    /// replicate values, and is missing when the well has none for that treatment.
    pub fn average_replicates(sheets: &IndexMap<String, ReplicateSheet>) -> PerturbationTable {
        let treatments = sheets.keys().map(|name| format!("{}_avg", name)).collect();
        let mut table = PerturbationTable::new(treatments);
        for sheet in sheets.values() {
            for well_id in sheet.rows.keys() {
                if !table.rows.contains_key(well_id) {
                    table.rows.insert(well_id.clone(), vec![None; sheets.len()]);
                }
            }
        }
        for (column, sheet) in sheets.values().enumerate() {
            for (well_id, replicates) in &sheet.rows {
                let present: Vec<f64> = replicates.iter().flatten().copied().collect();
                if present.is_empty() {
                    continue;
                }
                let mean = present.iter().sum::<f64>() / present.len() as f64;
                if let Some(row) = table.rows.get_mut(well_id) {
                    row[column] = Some(mean);
                }
            }
        }
        table
    }
}

/// Replicate measurements of a single treatment, one row per well-id
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSheet {
    pub rows: IndexMap<String, Vec<Option<f64>>>,
}

impl ReplicateSheet {
    /// Number of replicate columns (the widest row)
    pub fn num_replicates(&self) -> usize {
        self.rows.values().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Whether a value passes the fixed significance threshold (|value| ≥ threshold)
pub fn significant(value: f64, threshold: f64) -> bool {
    value.abs() >= threshold
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerturbationError {
    #[error("Well {0} is not in the perturbation table")]
    UnknownWell(String),
    #[error("Treatment column {0} is out of range")]
    TreatmentOutOfRange(usize),
    #[error("Row for well {well_id} has {found} values, expected {expected}")]
    RowLength {
        well_id: String,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_table() -> PerturbationTable {
        let mut table = PerturbationTable::new(vec![
            "PZA".to_string(),
            "EMB".to_string(),
            "RIF".to_string(),
        ]);
        table
            .add_row("W1", vec![Some(1.5), Some(2.0), Some(1.5)])
            .unwrap();
        table.add_row("W2", vec![Some(-1.0), None, Some(0.25)]).unwrap();
        table
    }

    #[test]
    fn combo_sums() {
        let table = setup_table();
        assert!((table.combo_sum("W1", &[0, 1, 2]).unwrap() - 5.0).abs() < 1e-12);
        assert!((table.combo_sum("W1", &[1]).unwrap() - 2.0).abs() < 1e-12);
        // Missing cells are skipped
        assert!((table.combo_sum("W2", &[0, 1, 2]).unwrap() + 0.75).abs() < 1e-12);
        assert!(table.combo_sum("W2", &[]).unwrap().abs() < 1e-12);
        assert_eq!(
            table.combo_sum("W7", &[0]).unwrap_err(),
            PerturbationError::UnknownWell("W7".to_string())
        );
        assert_eq!(
            table.combo_sum("W1", &[3]).unwrap_err(),
            PerturbationError::TreatmentOutOfRange(3)
        );
    }

    #[test]
    fn cells() {
        let mut table = setup_table();
        assert_eq!(table.value("W2", 1).unwrap(), None);
        assert_eq!(table.value("W1", 2).unwrap(), Some(1.5));
        assert_eq!(table.treatment_index("RIF"), Some(2));
        assert_eq!(table.len(), 2);
        assert!(table.add_row("W3", vec![Some(1.0)]).is_err());
        assert!(!table.contains_well("W3"));
    }

    #[test]
    fn replicate_averages() {
        let mut sheets = IndexMap::new();
        let mut pza = ReplicateSheet::default();
        pza.rows.insert("W1".to_string(), vec![Some(1.0), Some(3.0)]);
        pza.rows.insert("W2".to_string(), vec![None, None]);
        let mut emb = ReplicateSheet::default();
        emb.rows
            .insert("W2".to_string(), vec![Some(-1.0), None, Some(-2.0)]);
        emb.rows.insert("W3".to_string(), vec![Some(0.5), Some(0.5), Some(0.5)]);
        sheets.insert("PZA".to_string(), pza);
        sheets.insert("EMB".to_string(), emb);

        let table = PerturbationTable::average_replicates(&sheets);
        assert_eq!(table.treatments(), &["PZA_avg", "EMB_avg"]);
        assert_eq!(
            table.well_ids().collect::<Vec<_>>(),
            vec!["W1", "W2", "W3"]
        );
        assert_eq!(table.row("W1").unwrap(), &[Some(2.0), None]);
        assert_eq!(table.row("W2").unwrap(), &[None, Some(-1.5)]);
        assert_eq!(table.row("W3").unwrap(), &[None, Some(0.5)]);
        assert_eq!(sheets["EMB"].num_replicates(), 3);
    }

    #[test]
    fn significance() {
        assert!(significant(1.0, 1.0));
        assert!(significant(-2.5, 1.0));
        assert!(!significant(0.99, 1.0));
    }
}
