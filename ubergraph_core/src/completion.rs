//! Completion of a reaction network with source and sink pseudo-reactions
//!
//! A compound that is consumed but never produced gets a source (`-1 -> compound`), and a
//! compound that is produced but never consumed gets a sink (`compound -> -2`), so that every
//! compound has at least one producing and one consuming edge.
use std::collections::BTreeSet;

use log::{debug, info};

use crate::edges::{
    EdgeKind, EdgeTag, ExpandedTable, Node, ReactionKey, ReactionRow, ReactionTable, SimpleEdge,
};

/// Edge tables that can be completed with source and sink rows
pub trait Completable: Clone {
    /// Every node appearing as a substrate (list cells flattened)
    fn substrate_nodes(&self) -> Vec<&Node>;
    /// Every node appearing as a product (list cells flattened)
    fn product_nodes(&self) -> Vec<&Node>;
    /// Append a source row feeding `node`
    fn push_source(&mut self, node: Node);
    /// Append a sink row draining `node`
    fn push_sink(&mut self, node: Node);
}

impl Completable for ReactionTable {
    fn substrate_nodes(&self) -> Vec<&Node> {
        self.iter().flat_map(|r| r.substrates.iter()).collect()
    }

    fn product_nodes(&self) -> Vec<&Node> {
        self.iter().flat_map(|r| r.products.iter()).collect()
    }

    fn push_source(&mut self, node: Node) {
        self.push(ReactionRow::source(node));
    }

    fn push_sink(&mut self, node: Node) {
        self.push(ReactionRow::sink(node));
    }
}

impl Completable for ExpandedTable {
    fn substrate_nodes(&self) -> Vec<&Node> {
        self.edges.iter().map(|e| &e.source).collect()
    }

    fn product_nodes(&self) -> Vec<&Node> {
        self.edges.iter().map(|e| &e.target).collect()
    }

    fn push_source(&mut self, node: Node) {
        self.edges.push(SimpleEdge {
            reaction: ReactionKey::Source,
            source: Node::Source,
            target: node,
            tag: EdgeTag {
                kind: EdgeKind::Source,
                is_hyper: false,
            },
        });
    }

    fn push_sink(&mut self, node: Node) {
        self.edges.push(SimpleEdge {
            reaction: ReactionKey::Sink,
            source: node,
            target: Node::Sink,
            tag: EdgeTag {
                kind: EdgeKind::Sink,
                is_hyper: false,
            },
        });
    }
}

/// Nodes needing a source and nodes needing a sink, each sorted by [`Node`] order
///
/// Only compounds are considered; the sentinels and virtual junction nodes never need
/// completing.
pub fn unbalanced_nodes<T: Completable>(table: &T) -> (Vec<Node>, Vec<Node>) {
    let substrates: BTreeSet<&Node> = table
        .substrate_nodes()
        .into_iter()
        .filter(|n| n.is_compound())
        .collect();
    let products: BTreeSet<&Node> = table
        .product_nodes()
        .into_iter()
        .filter(|n| n.is_compound())
        .collect();
    let need_source = substrates
        .difference(&products)
        .map(|n| (*n).clone())
        .collect();
    let need_sink = products
        .difference(&substrates)
        .map(|n| (*n).clone())
        .collect();
    (need_source, need_sink)
}

/// Whether every compound of the table already has a producing and a consuming row
pub fn is_complete<T: Completable>(table: &T) -> bool {
    let (need_source, need_sink) = unbalanced_nodes(table);
    need_source.is_empty() && need_sink.is_empty()
}

/// Complete an edge table with source and sink rows
///
/// # Parameters
/// - `table`: A raw [`ReactionTable`] or an [`ExpandedTable`]
///
/// # Returns
/// A copy of `table` with its rows in their original order, followed by all source rows, then all
/// sink rows. Source and sink rows are sorted by compound id, so the output is reproducible.
/// Completing an already complete table returns it unchanged.
///
/// # Examples
/// ```rust
/// use ubergraph_core::completion::complete;
/// use ubergraph_core::edges::{Node, ReactionRow, ReactionTable};
/// use ubergraph_core::pathway::reaction::Reversibility;
/// let table = ReactionTable::from(vec![ReactionRow::reaction(
///     "rn:R1",
///     &["1"],
///     &["2"],
///     Reversibility::Irreversible,
/// )]);
/// let completed = complete(&table);
/// assert_eq!(completed.rows()[1], ReactionRow::source(Node::compound("1")));
/// assert_eq!(completed.rows()[2], ReactionRow::sink(Node::compound("2")));
/// ```
pub fn complete<T: Completable>(table: &T) -> T {
    let (need_source, need_sink) = unbalanced_nodes(table);
    let mut completed = table.clone();
    for node in &need_source {
        debug!("Adding source for {}", node);
        completed.push_source(node.clone());
    }
    for node in &need_sink {
        debug!("Adding sink for {}", node);
        completed.push_sink(node.clone());
    }
    info!(
        "Completed network with {} sources and {} sinks",
        need_source.len(),
        need_sink.len()
    );
    completed
}
