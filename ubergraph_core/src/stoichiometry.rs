//! Signed compounds × reactions flux matrix of a completed reaction table
//!
//! Every column moves the current level of a reaction's substrates onto its products:
//! - a simple reaction `s -> p` moves `level(s)`,
//! - a hyperedge moves the minimum of its substrate levels, out of every substrate and into every
//!     product,
//! - a source injects one unit into its compound,
//! - a sink drains the full level of its compound.
//!
//! Reactions flagged as uber edges have their flux scaled by their perturbation effect.
use indexmap::IndexMap;
use log::info;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csc::CscMatrix;
use thiserror::Error;

use crate::edges::{EdgeKind, Node, ReactionKey, ReactionRow, ReactionTable};
use crate::hypergraph::{HypergraphError, Ubergraph};
use crate::pathway::network::PathwayNetwork;
use crate::uberedge::UberedgeAnnotation;

// region Compound Index
/// Compound universe of a flux matrix, mapping compound ids to row indices
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundIndex {
    indices: IndexMap<String, usize>,
}

impl CompoundIndex {
    /// Index the given compound ids in order, repeated ids keep their first position
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut indices = IndexMap::new();
        for id in ids {
            let next = indices.len();
            indices.entry(id.into()).or_insert(next);
        }
        CompoundIndex { indices }
    }

    /// Index every compound of a table in order of first appearance (substrates before products)
    pub fn from_table(table: &ReactionTable) -> Self {
        Self::new(
            table
                .iter()
                .flat_map(|r| r.substrates.iter().chain(r.products.iter()))
                .filter_map(Node::as_compound),
        )
    }

    /// Index the compounds of a network in source order
    pub fn from_network(network: &PathwayNetwork) -> Self {
        Self::new(network.compounds().map(|c| c.id.as_str()))
    }

    pub fn index_of(&self, compound: &str) -> Option<usize> {
        self.indices.get(compound).copied()
    }

    /// Compound ids, in row order
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.indices.keys()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
// endregion Compound Index

// region Builder
/// Assembles the flux matrix of a reaction table
#[derive(Clone, Debug)]
pub struct StoichiometryBuilder<'a> {
    index: &'a CompoundIndex,
    /// Current level of every compound, in index order
    levels: DVector<f64>,
    annotation: &'a UberedgeAnnotation,
}

impl<'a> StoichiometryBuilder<'a> {
    /// # Parameters
    /// - `index`: Compound universe, fixing the row order
    /// - `levels`: One level per compound of `index`
    /// - `annotation`: Uber edge effects, used as flux weights
    pub fn new(
        index: &'a CompoundIndex,
        levels: DVector<f64>,
        annotation: &'a UberedgeAnnotation,
    ) -> Self {
        StoichiometryBuilder {
            index,
            levels,
            annotation,
        }
    }

    /// Build the dense flux matrix
    ///
    /// # Parameters
    /// - `table`: Completed reaction table, one column is built per row
    ///
    /// # Returns
    /// - `Ok`: Matrix with one row per indexed compound and one column per table row
    /// - `Err`: If the level vector does not match the index, a compound is missing from the
    ///     index, or a row is malformed
    ///
    /// # Examples
    /// ```rust
    /// use nalgebra::DVector;
    /// use ubergraph_core::edges::{ReactionRow, ReactionTable};
    /// use ubergraph_core::pathway::reaction::Reversibility;
    /// use ubergraph_core::stoichiometry::{CompoundIndex, StoichiometryBuilder};
    /// use ubergraph_core::uberedge::UberedgeAnnotation;
    /// let table = ReactionTable::from(vec![ReactionRow::reaction(
    ///     "rn:R1",
    ///     &["1"],
    ///     &["2"],
    ///     Reversibility::Irreversible,
    /// )]);
    /// let index = CompoundIndex::from_table(&table);
    /// let annotation = UberedgeAnnotation::default();
    /// let levels = DVector::from_vec(vec![3.0, 1.0]);
    /// let builder = StoichiometryBuilder::new(&index, levels, &annotation);
    /// let matrix = builder.build(&table).unwrap();
    /// assert_eq!(matrix[(0, 0)], -3.0);
    /// assert_eq!(matrix[(1, 0)], 3.0);
    /// ```
    pub fn build(&self, table: &ReactionTable) -> Result<DMatrix<f64>, StoichiometryError> {
        let entries = self.entries(table)?;
        let mut matrix = DMatrix::zeros(self.index.len(), table.len());
        for (row, column, value) in entries {
            matrix[(row, column)] += value;
        }
        info!(
            "Built {}x{} flux matrix",
            matrix.nrows(),
            matrix.ncols()
        );
        Ok(matrix)
    }

    /// Build the flux matrix in compressed sparse column form
    ///
    /// Same values as [`StoichiometryBuilder::build`], only non-zero entries are stored.
    pub fn build_sparse(
        &self,
        table: &ReactionTable,
    ) -> Result<CscMatrix<f64>, StoichiometryError> {
        let entries = self.entries(table)?;
        let mut coo = CooMatrix::new(self.index.len(), table.len());
        for (row, column, value) in entries {
            if value != 0.0 {
                coo.push(row, column, value);
            }
        }
        Ok(CscMatrix::from(&coo))
    }

    /// Build the flux matrix as a named hypergraph
    ///
    /// Nodes are named by compound id. Edges are named by reaction id, sources and sinks as
    /// `source_{compound}` and `sink_{compound}`. A table listing the same reaction twice fails
    /// with [`HypergraphError::DuplicateName`].
    pub fn build_graph(&self, table: &ReactionTable) -> Result<Ubergraph, StoichiometryError> {
        let mut graph = Ubergraph::from_matrix(self.build(table)?);
        for (id, compound) in self.index.ids().enumerate() {
            graph.set_node_name(id, compound)?;
        }
        for (id, row) in table.iter().enumerate() {
            let name = match row.kind {
                EdgeKind::Source => format!("source_{}", join_nodes(&row.products)),
                EdgeKind::Sink => format!("sink_{}", join_nodes(&row.substrates)),
                EdgeKind::Reaction(_) => row.reaction.to_string(),
            };
            graph.set_edge_name(id, &name)?;
        }
        Ok(graph)
    }

    /// Every (row, column, value) contribution of the table, duplicates are to be summed
    fn entries(
        &self,
        table: &ReactionTable,
    ) -> Result<Vec<(usize, usize, f64)>, StoichiometryError> {
        if self.levels.len() != self.index.len() {
            return Err(StoichiometryError::LevelLength {
                expected: self.index.len(),
                found: self.levels.len(),
            });
        }
        if let Some((compound, _)) = self
            .index
            .ids()
            .zip(self.levels.iter())
            .find(|(_, level)| !level.is_finite())
        {
            return Err(StoichiometryError::NonFiniteLevel {
                compound: compound.clone(),
            });
        }
        let mut entries = Vec::new();
        for (column, row) in table.iter().enumerate() {
            self.column(column, row, &mut entries)?;
        }
        Ok(entries)
    }

    fn column(
        &self,
        column: usize,
        row: &ReactionRow,
        entries: &mut Vec<(usize, usize, f64)>,
    ) -> Result<(), StoichiometryError> {
        if row.is_malformed() {
            return Err(StoichiometryError::MalformedRow(row.reaction.clone()));
        }
        match row.kind {
            EdgeKind::Source => {
                for product in &row.products {
                    entries.push((self.row_of(product)?, column, 1.0));
                }
            }
            EdgeKind::Sink => {
                for substrate in &row.substrates {
                    let i = self.row_of(substrate)?;
                    entries.push((i, column, -self.levels[i]));
                }
            }
            EdgeKind::Reaction(_) => {
                let weight = self.annotation.weight(&row.reaction);
                let mut flux = f64::INFINITY;
                let mut substrate_rows = Vec::with_capacity(row.substrates.len());
                for substrate in &row.substrates {
                    let i = self.row_of(substrate)?;
                    flux = flux.min(self.levels[i]);
                    substrate_rows.push(i);
                }
                flux *= weight;
                for i in substrate_rows {
                    entries.push((i, column, -flux));
                }
                for product in &row.products {
                    entries.push((self.row_of(product)?, column, flux));
                }
            }
        }
        Ok(())
    }

    fn row_of(&self, node: &Node) -> Result<usize, StoichiometryError> {
        node.as_compound()
            .and_then(|id| self.index.index_of(id))
            .ok_or_else(|| StoichiometryError::UnknownCompound(node.to_string()))
    }
}
// endregion Builder

fn join_nodes(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoichiometryError {
    #[error("Level vector has {found} entries, expected {expected}")]
    LevelLength { expected: usize, found: usize },
    #[error("Level of compound {compound} is not a finite number")]
    NonFiniteLevel { compound: String },
    #[error("Compound {0} is not in the compound index")]
    UnknownCompound(String),
    #[error("Reaction {0} has no substrates or no products")]
    MalformedRow(ReactionKey),
    #[error("Unable to name the flux graph")]
    Hypergraph(#[from] HypergraphError),
}
