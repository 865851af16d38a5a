//! Typed edge tables produced from a pathway network
//!
//! A [`ReactionTable`] keeps every reaction as a (possibly hyper) edge with lists of substrates
//! and products. Expanding it (see [`crate::expansion`]) gives an [`ExpandedTable`] of simple
//! directed edges, where each hyperedge is routed through its own [`VirtualNode`].
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::pathway::reaction::Reversibility;

// region Nodes
/// A node of the reaction graph
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// A compound of the pathway, by compound id
    Compound(String),
    /// Junction node introduced when expanding a hyperedge
    Virtual(VirtualNode),
    /// Sentinel feeding source pseudo-reactions, written as `-1`
    Source,
    /// Sentinel drained by sink pseudo-reactions, written as `-2`
    Sink,
}

impl Node {
    pub fn compound(id: &str) -> Node {
        Node::Compound(id.to_string())
    }

    /// The compound id, if this node is a compound
    pub fn as_compound(&self) -> Option<&str> {
        match self {
            Node::Compound(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Node::Compound(_))
    }

    fn rank(&self) -> u8 {
        match self {
            Node::Compound(_) => 0,
            Node::Virtual(_) => 1,
            Node::Source => 2,
            Node::Sink => 3,
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Compound(id) => write!(f, "{}", id),
            Node::Virtual(v) => write!(f, "{}", v),
            Node::Source => write!(f, "-1"),
            Node::Sink => write!(f, "-2"),
        }
    }
}

/// Compounds order numerically when their ids are integers (as pathway entry ids are), and
/// after all numeric ids in lexical order otherwise
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Node::Compound(a), Node::Compound(b)) => compare_ids(a, b),
            (Node::Virtual(a), Node::Virtual(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Junction node of an expanded hyperedge
///
/// The id is the position of the hyperedge's row in the table being expanded, so every row gets
/// its own node and ids do not depend on any shared counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualNode {
    pub reaction_index: usize,
}

impl Display for VirtualNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}", self.reaction_index)
    }
}

impl Serialize for VirtualNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
// endregion Nodes

// region Reactions
/// Identifier of a row of an edge table
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReactionKey {
    /// A reaction of the pathway, by reaction id
    Reaction(String),
    /// Synthesized source pseudo-reaction, written as `-1`
    Source,
    /// Synthesized sink pseudo-reaction, written as `-2`
    Sink,
}

impl ReactionKey {
    /// The reaction id, if this is a pathway reaction
    pub fn as_reaction(&self) -> Option<&str> {
        match self {
            ReactionKey::Reaction(id) => Some(id),
            _ => None,
        }
    }
}

impl Display for ReactionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionKey::Reaction(id) => write!(f, "{}", id),
            ReactionKey::Source => write!(f, "-1"),
            ReactionKey::Sink => write!(f, "-2"),
        }
    }
}

impl Serialize for ReactionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What kind of row an edge table row is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A pathway reaction with its reversibility
    Reaction(Reversibility),
    /// Source pseudo-reaction
    Source,
    /// Sink pseudo-reaction
    Sink,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Reaction(r) => write!(f, "{}", r),
            EdgeKind::Source => write!(f, "source"),
            EdgeKind::Sink => write!(f, "sink"),
        }
    }
}

impl Serialize for EdgeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A row of the reaction table: one (hyper)edge from substrates to products
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReactionRow {
    #[serde(rename = "reaction_id")]
    pub reaction: ReactionKey,
    #[serde(rename = "substrate")]
    pub substrates: Vec<Node>,
    #[serde(rename = "product")]
    pub products: Vec<Node>,
    #[serde(rename = "reaction_type")]
    pub kind: EdgeKind,
}

impl ReactionRow {
    /// Row for a pathway reaction
    pub fn reaction(
        id: &str,
        substrates: &[&str],
        products: &[&str],
        reversibility: Reversibility,
    ) -> ReactionRow {
        ReactionRow {
            reaction: ReactionKey::Reaction(id.to_string()),
            substrates: substrates.iter().map(|s| Node::compound(s)).collect(),
            products: products.iter().map(|p| Node::compound(p)).collect(),
            kind: EdgeKind::Reaction(reversibility),
        }
    }

    /// Source pseudo-reaction feeding `node`
    pub fn source(node: Node) -> ReactionRow {
        ReactionRow {
            reaction: ReactionKey::Source,
            substrates: vec![Node::Source],
            products: vec![node],
            kind: EdgeKind::Source,
        }
    }

    /// Sink pseudo-reaction draining `node`
    pub fn sink(node: Node) -> ReactionRow {
        ReactionRow {
            reaction: ReactionKey::Sink,
            substrates: vec![node],
            products: vec![Node::Sink],
            kind: EdgeKind::Sink,
        }
    }

    pub fn is_hyper(&self) -> bool {
        self.substrates.len() > 1 || self.products.len() > 1
    }

    pub fn is_reversible(&self) -> bool {
        self.kind == EdgeKind::Reaction(Reversibility::Reversible)
    }

    /// A row is malformed when it has no substrates or no products
    pub fn is_malformed(&self) -> bool {
        self.substrates.is_empty() || self.products.is_empty()
    }
}

/// Edge table with one row per reaction, hyperedges kept intact
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReactionTable {
    rows: Vec<ReactionRow>,
}

impl ReactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ReactionRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ReactionRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReactionRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<ReactionRow>> for ReactionTable {
    fn from(rows: Vec<ReactionRow>) -> Self {
        ReactionTable { rows }
    }
}

impl FromIterator<ReactionRow> for ReactionTable {
    fn from_iter<T: IntoIterator<Item = ReactionRow>>(iter: T) -> Self {
        ReactionTable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ReactionTable {
    type Item = &'a ReactionRow;
    type IntoIter = std::slice::Iter<'a, ReactionRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
// endregion Reactions

// region Expanded Edges
/// Type tag of an expanded edge: the kind of the originating row, and whether that row was a
/// hyperedge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeTag {
    pub kind: EdgeKind,
    pub is_hyper: bool,
}

/// Written as the kind directly followed by the capitalised hyperedge flag, e.g.
/// `reversibleFalse`
impl Display for EdgeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let flag = if self.is_hyper { "True" } else { "False" };
        write!(f, "{}{}", self.kind, flag)
    }
}

impl Serialize for EdgeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A simple directed edge of the expanded graph
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimpleEdge {
    #[serde(rename = "reaction_id")]
    pub reaction: ReactionKey,
    #[serde(rename = "substrate")]
    pub source: Node,
    #[serde(rename = "product")]
    pub target: Node,
    #[serde(rename = "reaction_type")]
    pub tag: EdgeTag,
}

/// Edge table with every hyperedge expanded into simple edges
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpandedTable {
    pub edges: Vec<SimpleEdge>,
    /// Virtual nodes introduced during the expansion, in creation order
    pub virtual_nodes: Vec<VirtualNode>,
}

impl ExpandedTable {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges originating from the given reaction
    pub fn edges_of<'a>(
        &'a self,
        reaction: &'a ReactionKey,
    ) -> impl Iterator<Item = &'a SimpleEdge> {
        self.edges.iter().filter(move |e| &e.reaction == reaction)
    }
}

/// Written as the flat edge table, like [`ReactionTable`]
impl Serialize for ExpandedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.edges)
    }
}
// endregion Expanded Edges
