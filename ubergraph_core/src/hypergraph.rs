//! This module provides the Ubergraph struct, a hypergraph stored as a dense signed incidence
//! matrix
//!
//! Rows of the matrix correspond to nodes and columns correspond to edges. An entry is negative
//! when the node is consumed by the edge, positive when it is produced, and zero otherwise.
use std::collections::HashMap;

use nalgebra::{DMatrix, DVector, RowDVector};
use thiserror::Error;

/// Hypergraph represented by a node × edge incidence matrix
///
/// The graph only ever grows: nodes and edges can be appended and overwritten, but never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Ubergraph {
    /// Incidence matrix, rows are nodes and columns are edges
    matrix: DMatrix<f64>,
    /// Name of every node, by row
    node_names: Vec<String>,
    /// Name of every edge, by column
    edge_names: Vec<String>,
    /// Map of node names to row indices
    node_lookup: HashMap<String, usize>,
    /// Map of edge names to column indices
    edge_lookup: HashMap<String, usize>,
}

impl Ubergraph {
    // region Creation Functions
    /// Create a hypergraph from a list of edge incidence vectors
    ///
    /// # Parameters
    /// - `edges`: One incidence vector per edge, all of the same length (the number of nodes)
    ///
    /// # Returns
    /// The hypergraph with nodes named `v_0, v_1, ...` and edges named `e_0, e_1, ...`, or
    /// [`HypergraphError::IncidenceLength`] if the vectors disagree on the number of nodes.
    ///
    /// # Examples
    /// ```rust
    /// use nalgebra::DVector;
    /// use ubergraph_core::hypergraph::Ubergraph;
    /// let graph = Ubergraph::from_edges(&[
    ///     DVector::from_vec(vec![1., 0., 0., 0.]),
    ///     DVector::from_vec(vec![0., -2., 0., 0.]),
    ///     DVector::from_vec(vec![1., 1., 0., 0.]),
    /// ])
    /// .unwrap();
    /// assert_eq!(graph.order(), 4);
    /// assert_eq!(graph.size(), 3);
    /// ```
    pub fn from_edges(edges: &[DVector<f64>]) -> Result<Self, HypergraphError> {
        let order = edges.first().map(|e| e.len()).unwrap_or(0);
        if let Some(bad) = edges.iter().find(|e| e.len() != order) {
            return Err(HypergraphError::IncidenceLength {
                expected: order,
                found: bad.len(),
            });
        }
        let matrix = if edges.is_empty() {
            DMatrix::zeros(0, 0)
        } else {
            DMatrix::from_columns(edges)
        };
        Ok(Self::from_matrix(matrix))
    }

    /// Create a hypergraph directly from an incidence matrix, using default names
    pub fn from_matrix(matrix: DMatrix<f64>) -> Self {
        let node_names: Vec<String> = (0..matrix.nrows()).map(|i| format!("v_{}", i)).collect();
        let edge_names: Vec<String> = (0..matrix.ncols()).map(|i| format!("e_{}", i)).collect();
        let node_lookup = Self::index_names(&node_names);
        let edge_lookup = Self::index_names(&edge_names);
        Ubergraph {
            matrix,
            node_names,
            edge_names,
            node_lookup,
            edge_lookup,
        }
    }

    fn index_names(names: &[String]) -> HashMap<String, usize> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect()
    }
    // endregion Creation Functions

    // region Accessors
    /// Number of nodes (rows)
    pub fn order(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of edges (columns)
    pub fn size(&self) -> usize {
        self.matrix.ncols()
    }

    /// The underlying incidence matrix
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn node_name(&self, id: usize) -> Result<&str, HypergraphError> {
        self.node_names
            .get(id)
            .map(|n| n.as_str())
            .ok_or(HypergraphError::NodeOutOfRange(id))
    }

    pub fn edge_name(&self, id: usize) -> Result<&str, HypergraphError> {
        self.edge_names
            .get(id)
            .map(|n| n.as_str())
            .ok_or(HypergraphError::EdgeOutOfRange(id))
    }

    /// Row index of the node called `name`
    pub fn node_id(&self, name: &str) -> Result<usize, HypergraphError> {
        self.node_lookup
            .get(name)
            .copied()
            .ok_or_else(|| HypergraphError::UnknownNode(name.to_string()))
    }

    /// Column index of the edge called `name`
    pub fn edge_id(&self, name: &str) -> Result<usize, HypergraphError> {
        self.edge_lookup
            .get(name)
            .copied()
            .ok_or_else(|| HypergraphError::UnknownEdge(name.to_string()))
    }

    /// Incidence of a node across all edges (a copy of its row)
    pub fn node(&self, id: usize) -> Result<RowDVector<f64>, HypergraphError> {
        if id >= self.order() {
            return Err(HypergraphError::NodeOutOfRange(id));
        }
        Ok(self.matrix.row(id).into_owned())
    }

    /// Incidence of an edge across all nodes (a copy of its column)
    pub fn edge(&self, id: usize) -> Result<DVector<f64>, HypergraphError> {
        if id >= self.size() {
            return Err(HypergraphError::EdgeOutOfRange(id));
        }
        Ok(self.matrix.column(id).into_owned())
    }

    pub fn node_by_name(&self, name: &str) -> Result<RowDVector<f64>, HypergraphError> {
        self.node(self.node_id(name)?)
    }

    pub fn edge_by_name(&self, name: &str) -> Result<DVector<f64>, HypergraphError> {
        self.edge(self.edge_id(name)?)
    }
    // endregion Accessors

    // region Mutation
    /// Rename a node
    ///
    /// # Note:
    /// Names must stay unique, renaming to a name held by another node fails with
    /// [`HypergraphError::DuplicateName`].
    pub fn set_node_name(&mut self, id: usize, name: &str) -> Result<(), HypergraphError> {
        Self::rename(
            &mut self.node_names,
            &mut self.node_lookup,
            id,
            name,
            HypergraphError::NodeOutOfRange(id),
        )
    }

    /// Rename an edge, names must stay unique (see [`Ubergraph::set_node_name`])
    pub fn set_edge_name(&mut self, id: usize, name: &str) -> Result<(), HypergraphError> {
        Self::rename(
            &mut self.edge_names,
            &mut self.edge_lookup,
            id,
            name,
            HypergraphError::EdgeOutOfRange(id),
        )
    }

    fn rename(
        names: &mut [String],
        lookup: &mut HashMap<String, usize>,
        id: usize,
        name: &str,
        out_of_range: HypergraphError,
    ) -> Result<(), HypergraphError> {
        if id >= names.len() {
            return Err(out_of_range);
        }
        match lookup.get(name) {
            Some(&existing) if existing == id => return Ok(()),
            Some(_) => return Err(HypergraphError::DuplicateName(name.to_string())),
            None => {}
        }
        lookup.remove(&names[id]);
        lookup.insert(name.to_string(), id);
        names[id] = name.to_string();
        Ok(())
    }

    /// Overwrite the incidence of a node
    pub fn set_node(
        &mut self,
        id: usize,
        incidence: &RowDVector<f64>,
    ) -> Result<(), HypergraphError> {
        if id >= self.order() {
            return Err(HypergraphError::NodeOutOfRange(id));
        }
        self.check_length(self.size(), incidence.len())?;
        self.matrix.set_row(id, incidence);
        Ok(())
    }

    /// Overwrite the incidence of an edge
    pub fn set_edge(&mut self, id: usize, incidence: &DVector<f64>) -> Result<(), HypergraphError> {
        if id >= self.size() {
            return Err(HypergraphError::EdgeOutOfRange(id));
        }
        self.check_length(self.order(), incidence.len())?;
        self.matrix.set_column(id, incidence);
        Ok(())
    }

    pub fn set_node_by_name(
        &mut self,
        name: &str,
        incidence: &RowDVector<f64>,
    ) -> Result<(), HypergraphError> {
        let id = self.node_id(name)?;
        self.set_node(id, incidence)
    }

    pub fn set_edge_by_name(
        &mut self,
        name: &str,
        incidence: &DVector<f64>,
    ) -> Result<(), HypergraphError> {
        let id = self.edge_id(name)?;
        self.set_edge(id, incidence)
    }

    /// Append an edge with a default name, returning its column index
    ///
    /// The name is `e_{size}`, or `e_{n}` for the first larger `n` not already taken by a
    /// renamed edge.
    pub fn add_edge(&mut self, incidence: &DVector<f64>) -> Result<usize, HypergraphError> {
        let name = free_name("e", self.size(), &self.edge_lookup);
        self.add_named_edge(&name, incidence)
    }

    /// Append a named edge, returning its column index
    pub fn add_named_edge(
        &mut self,
        name: &str,
        incidence: &DVector<f64>,
    ) -> Result<usize, HypergraphError> {
        self.check_length(self.order(), incidence.len())?;
        if self.edge_lookup.contains_key(name) {
            return Err(HypergraphError::DuplicateName(name.to_string()));
        }
        let id = self.size();
        self.matrix.resize_mut(self.order(), id + 1, 0.0);
        self.matrix.set_column(id, incidence);
        self.edge_names.push(name.to_string());
        self.edge_lookup.insert(name.to_string(), id);
        Ok(id)
    }

    /// Append a node with a default name (`v_{order}`, skipping taken names like
    /// [`Ubergraph::add_edge`]), returning its row index
    pub fn add_node(&mut self, incidence: &RowDVector<f64>) -> Result<usize, HypergraphError> {
        let name = free_name("v", self.order(), &self.node_lookup);
        self.add_named_node(&name, incidence)
    }

    /// Append a named node, returning its row index
    pub fn add_named_node(
        &mut self,
        name: &str,
        incidence: &RowDVector<f64>,
    ) -> Result<usize, HypergraphError> {
        self.check_length(self.size(), incidence.len())?;
        if self.node_lookup.contains_key(name) {
            return Err(HypergraphError::DuplicateName(name.to_string()));
        }
        let id = self.order();
        self.matrix.resize_mut(id + 1, self.size(), 0.0);
        self.matrix.set_row(id, incidence);
        self.node_names.push(name.to_string());
        self.node_lookup.insert(name.to_string(), id);
        Ok(id)
    }

    fn check_length(&self, expected: usize, found: usize) -> Result<(), HypergraphError> {
        if expected != found {
            return Err(HypergraphError::IncidenceLength { expected, found });
        }
        Ok(())
    }
    // endregion Mutation
}

/// First `{prefix}_{n}` with `n >= start` that is not a key of `lookup`
fn free_name(prefix: &str, start: usize, lookup: &HashMap<String, usize>) -> String {
    (start..)
        .map(|n| format!("{}_{}", prefix, n))
        .find(|name| !lookup.contains_key(name))
        .unwrap_or_else(|| format!("{}_{}", prefix, start))
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HypergraphError {
    #[error("Node index {0} is out of range")]
    NodeOutOfRange(usize),
    #[error("Edge index {0} is out of range")]
    EdgeOutOfRange(usize),
    #[error("No node named {0}")]
    UnknownNode(String),
    #[error("No edge named {0}")]
    UnknownEdge(String),
    #[error("Name {0} is already in use")]
    DuplicateName(String),
    #[error("Incidence vector has length {found}, expected {expected}")]
    IncidenceLength { expected: usize, found: usize },
}
