//! Module providing JSON IO for pathways, measurement tables, and the computed edge tables
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crossref::GeneLookupTable;
use crate::edges::{ExpandedTable, ReactionTable};
use crate::pathway::compound::Compound;
use crate::pathway::gene::Gene;
use crate::pathway::network::{Pathway, PathwayError, PathwayNetwork};
use crate::pathway::reaction::{
    Reaction, ReactionBuilder, ReactionBuilderError, Reversibility, ReversibilityParseError,
};
use crate::pathway::relation::{Entry, Relation};
use crate::perturbation::{PerturbationError, PerturbationTable, ReplicateSheet};
use crate::uberedge::UberedgeAnnotation;

// region JSON Pathway
/// Represents a JSON serialized pathway, as written by a KGML converter
#[derive(Serialize, Deserialize)]
struct JsonPathway {
    name: Option<String>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default)]
    compounds: Vec<JsonCompound>,
    #[serde(default)]
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    relations: Vec<JsonRelation>,
    #[serde(default)]
    entries: Vec<JsonEntry>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    name: Option<String>,
    reaction: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonCompound {
    id: String,
    name: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    substrates: Vec<String>,
    products: Vec<String>,
    #[serde(rename = "type")]
    reaction_type: String,
}

#[derive(Serialize, Deserialize)]
struct JsonRelation {
    entry1: String,
    entry2: String,
    #[serde(rename = "type")]
    relation_type: String,
    subtypes: Option<Vec<(String, String)>>,
}

#[derive(Serialize, Deserialize)]
struct JsonEntry {
    id: String,
    name: Option<String>,
}
// endregion JSON Pathway

// region Conversions
impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name.unwrap_or_default(),
            reaction: g.reaction.unwrap_or_default(),
        }
    }
}

impl From<JsonCompound> for Compound {
    fn from(c: JsonCompound) -> Self {
        Self {
            id: c.id,
            name: c.name.unwrap_or_default(),
        }
    }
}

impl From<JsonRelation> for Relation {
    fn from(r: JsonRelation) -> Self {
        Self {
            entry1: r.entry1,
            entry2: r.entry2,
            relation_type: r.relation_type,
            subtypes: r.subtypes.unwrap_or_default(),
        }
    }
}

impl From<JsonEntry> for Entry {
    fn from(e: JsonEntry) -> Self {
        Self {
            id: e.id,
            name: e.name.unwrap_or_default(),
        }
    }
}

impl From<Gene> for JsonGene {
    fn from(g: Gene) -> Self {
        Self {
            id: g.id,
            name: Some(g.name),
            reaction: Some(g.reaction),
        }
    }
}

impl From<Compound> for JsonCompound {
    fn from(c: Compound) -> Self {
        Self {
            id: c.id,
            name: Some(c.name),
        }
    }
}

impl From<Reaction> for JsonReaction {
    fn from(r: Reaction) -> Self {
        Self {
            id: r.id,
            name: Some(r.name),
            substrates: r.substrates,
            products: r.products,
            reaction_type: r.reversibility.to_string(),
        }
    }
}

impl From<Relation> for JsonRelation {
    fn from(r: Relation) -> Self {
        Self {
            entry1: r.entry1,
            entry2: r.entry2,
            relation_type: r.relation_type,
            subtypes: Some(r.subtypes),
        }
    }
}

impl From<Entry> for JsonEntry {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            name: Some(e.name),
        }
    }
}

impl Pathway {
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Pathway, JsonError> {
        let pathway_str = read_file(path)?;
        Pathway::from_json_str(&pathway_str)
    }

    pub fn from_json_str(data: &str) -> Result<Pathway, JsonError> {
        let json_pathway = match serde_json::from_str::<JsonPathway>(data) {
            Ok(pathway) => pathway,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Pathway::from_json(json_pathway)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        write_serialized(&self.to_json(), path)
    }

    fn from_json(json_pathway: JsonPathway) -> Result<Self, JsonError> {
        let mut reactions = Vec::with_capacity(json_pathway.reactions.len());
        for rxn in json_pathway.reactions {
            let reaction = ReactionBuilder::default()
                .id(rxn.id)
                .name(rxn.name.unwrap_or_default())
                .substrates(rxn.substrates)
                .products(rxn.products)
                .reversibility(rxn.reaction_type.parse::<Reversibility>()?)
                .build()?;
            reactions.push(reaction);
        }
        Ok(Pathway {
            name: json_pathway.name.unwrap_or_default(),
            genes: json_pathway.genes.into_iter().map(Gene::from).collect(),
            compounds: json_pathway
                .compounds
                .into_iter()
                .map(Compound::from)
                .collect(),
            reactions,
            relations: json_pathway
                .relations
                .into_iter()
                .map(Relation::from)
                .collect(),
            entries: json_pathway.entries.into_iter().map(Entry::from).collect(),
        })
    }

    fn to_json(&self) -> JsonPathway {
        JsonPathway {
            name: Some(self.name.clone()),
            genes: self.genes.iter().cloned().map(JsonGene::from).collect(),
            compounds: self
                .compounds
                .iter()
                .cloned()
                .map(JsonCompound::from)
                .collect(),
            reactions: self
                .reactions
                .iter()
                .cloned()
                .map(JsonReaction::from)
                .collect(),
            relations: self
                .relations
                .iter()
                .cloned()
                .map(JsonRelation::from)
                .collect(),
            entries: self.entries.iter().cloned().map(JsonEntry::from).collect(),
        }
    }
}

impl PathwayNetwork {
    /// Read a pathway document and wrap it into a network
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<PathwayNetwork, JsonError> {
        let pathway = Pathway::read_json(path)?;
        Ok(PathwayNetwork::new(pathway)?)
    }
}
// endregion Conversions

// region Measurement Tables
/// Represents a JSON serialized perturbation table
#[derive(Serialize, Deserialize)]
struct JsonPerturbationTable {
    treatments: Vec<String>,
    /// Map of well-ids to one value per treatment, `null` for missing cells
    rows: IndexMap<String, Vec<Option<f64>>>,
}

impl PerturbationTable {
    /// Read a perturbation table, checking that every row has one value per treatment
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<PerturbationTable, JsonError> {
        let table_str = read_file(path)?;
        let json_table = match serde_json::from_str::<JsonPerturbationTable>(&table_str) {
            Ok(table) => table,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        let mut table = PerturbationTable::new(json_table.treatments);
        for (well_id, values) in json_table.rows {
            table.add_row(&well_id, values)?;
        }
        Ok(table)
    }

    /// Read replicate sheets (a map of treatment names to sheets) and average them
    ///
    /// See [`PerturbationTable::average_replicates`].
    pub fn read_replicates_json<P: AsRef<Path>>(path: P) -> Result<PerturbationTable, JsonError> {
        let sheets_str = read_file(path)?;
        let sheets = match serde_json::from_str::<IndexMap<String, ReplicateSheet>>(&sheets_str) {
            Ok(sheets) => sheets,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Ok(PerturbationTable::average_replicates(&sheets))
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        write_serialized(self, path)
    }
}

impl GeneLookupTable {
    /// Read a lookup table, written as a list of `{"well_id": ..., "gene_name": ...}` rows
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<GeneLookupTable, JsonError> {
        let table_str = read_file(path)?;
        Ok(serde_json::from_str(&table_str)?)
    }
}
// endregion Measurement Tables

// region Outputs
impl ReactionTable {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        write_serialized(self, path)
    }
}

impl ExpandedTable {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        write_serialized(self, path)
    }
}

impl UberedgeAnnotation {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        write_serialized(self, path)
    }
}

fn read_file<P: AsRef<Path>>(path: P) -> Result<String, JsonError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(data),
        Err(err) => Err(JsonError::UnableToRead(format!("{:?}", err))),
    }
}

fn write_serialized<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), JsonError> {
    let json_string = serde_json::to_string(value)?;
    fs::write(path, json_string)?;
    Ok(())
}
// endregion Outputs

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Invalid reaction type")]
    UnknownReactionType(#[from] ReversibilityParseError),
    #[error("Invalid pathway")]
    InvalidPathway(#[from] PathwayError),
    #[error("Invalid perturbation table")]
    InvalidPerturbations(#[from] PerturbationError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}


#[cfg(test)]
mod pathway_tests {
    use super::*;
    use std::path::PathBuf;

    fn test_data(dir: &str, file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join(dir)
            .join(file)
    }

    #[test]
    fn read_json() {
        let pathway = Pathway::read_json(test_data("test_pathways", "mtu_test.json")).unwrap();
        assert_eq!(pathway.name, "path:mtu_test");

        let gene = pathway.genes.first().unwrap();
        assert_eq!(gene.id, "10");
        assert_eq!(gene.names().collect::<Vec<_>>(), vec!["mtu:gA"]);
        assert_eq!(gene.reaction_ids().collect::<Vec<_>>(), vec!["rn:R1", "rn:R2"]);

        let hyper = &pathway.reactions[1];
        assert_eq!(hyper.id, "rn:R2");
        assert!(hyper.is_hyper());
        assert_eq!(pathway.reactions[2].reversibility, Reversibility::Reversible);

        let relation = pathway.relations.first().unwrap();
        assert!(relation.has_subtype("compound"));
        assert_eq!(pathway.entries[1].name, "mtu:gB");
    }

    #[test]
    fn read_network() {
        let network =
            PathwayNetwork::read_json(test_data("test_pathways", "mtu_test.json")).unwrap();
        assert_eq!(network.gene_list(), &["mtu:gA", "mtu:gB", "mtu:gC"]);
        assert_eq!(network.reaction_table().len(), 3);
        assert_eq!(network.compound_list().len(), 5);
    }

    #[test]
    fn bad_documents() {
        assert!(matches!(
            Pathway::read_json(test_data("test_pathways", "missing.json")),
            Err(JsonError::UnableToRead(_))
        ));
        assert!(matches!(
            Pathway::from_json_str("{\"genes\": 3}"),
            Err(JsonError::UnableToParse(_))
        ));
        let sideways = r#"{"reactions":[{"id":"rn:R1","substrates":["1"],"products":["2"],"type":"sideways"}]}"#;
        assert!(matches!(
            Pathway::from_json_str(sideways),
            Err(JsonError::UnknownReactionType(_))
        ));

        // The document parses, but the empty product list is rejected by the network
        let pathway = Pathway::from_json_str(
            r#"{"reactions":[{"id":"rn:R1","substrates":["1"],"products":[],"type":"irreversible"}]}"#,
        )
        .unwrap();
        assert_eq!(
            PathwayNetwork::new(pathway).unwrap_err(),
            PathwayError::MalformedReaction("rn:R1".to_string())
        );
    }

    #[test]
    fn to_json() {
        let pathway = Pathway::read_json(test_data("test_pathways", "mtu_test.json")).unwrap();
        let json_pathway = pathway.to_json();
        let reaction = json_pathway.reactions.first().unwrap();
        assert_eq!(reaction.id, "rn:R1");
        assert_eq!(reaction.reaction_type, "irreversible");
        let json_str = serde_json::to_string(&json_pathway).unwrap();
        let reread = Pathway::from_json_str(&json_str).unwrap();
        assert_eq!(reread, pathway);
    }

    #[test]
    fn measurement_tables() {
        let table =
            PerturbationTable::read_json(test_data("test_perturbations", "perturbations.json"))
                .unwrap();
        assert_eq!(table.treatments(), &["PZA", "EMB", "RIF"]);
        assert_eq!(table.value("W2", 2).unwrap(), None);
        assert!((table.combo_sum("W1", &[0, 1, 2]).unwrap() - 5.0).abs() < 1e-12);

        let lookup =
            GeneLookupTable::read_json(test_data("test_perturbations", "lookup.json")).unwrap();
        assert_eq!(lookup.well_id_for_gene("gB"), Some("W2"));
        assert_eq!(lookup.gene_for_well_id("W1"), Some("gA"));

        let replicates = test_data("test_perturbations", "replicates.json");
        let averaged = PerturbationTable::read_replicates_json(replicates).unwrap();
        assert_eq!(averaged.treatments(), &["PZA_avg", "EMB_avg"]);
        assert_eq!(averaged.row("W1").unwrap(), &[Some(2.0), Some(-1.0)]);
        assert_eq!(averaged.row("W2").unwrap(), &[None, Some(0.5)]);
    }

    #[test]
    fn ragged_perturbation_rows() {
        let path = std::env::temp_dir().join("ubergraph_core_ragged_perturbations.json");
        fs::write(&path, r#"{"treatments":["PZA","EMB"],"rows":{"W1":[1.0]}}"#).unwrap();
        assert!(matches!(
            PerturbationTable::read_json(&path),
            Err(JsonError::InvalidPerturbations(PerturbationError::RowLength { .. }))
        ));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn write_outputs() {
        let network =
            PathwayNetwork::read_json(test_data("test_pathways", "mtu_test.json")).unwrap();
        let table = network.reaction_table();
        let path = std::env::temp_dir().join("ubergraph_core_reaction_table.json");
        table.write_json(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written[1],
            serde_json::json!({
                "reaction_id": "rn:R2",
                "substrate": ["2", "3"],
                "product": ["4"],
                "reaction_type": "irreversible"
            })
        );
        fs::remove_file(&path).unwrap();

        let expanded = crate::expansion::expand(&table).unwrap();
        let path = std::env::temp_dir().join("ubergraph_core_expanded_table.json");
        expanded.write_json(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 7);
        assert_eq!(
            written[1],
            serde_json::json!({
                "reaction_id": "rn:R2",
                "substrate": "2",
                "product": "h1",
                "reaction_type": "irreversibleTrue"
            })
        );
        fs::remove_file(&path).unwrap();

        let mut effects = IndexMap::new();
        effects.insert("rn:R1".to_string(), 5.0);
        let annotation = UberedgeAnnotation::new(effects);
        let path = std::env::temp_dir().join("ubergraph_core_annotation.json");
        annotation.write_json(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"rn:R1": 5.0}));
        fs::remove_file(&path).unwrap();
    }
}
