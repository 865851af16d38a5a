//! Expansion of hyperedges into simple directed edges
//!
//! A reaction with a single substrate and a single product becomes one edge (two for reversible
//! reactions). A hyperedge `a1, a2 -> b1` is routed through a virtual junction node `h`:
//! `a1 -> h`, `h -> b1`, `a2 -> h`, `h -> b1` (plus the reverse edges when reversible).
use log::{debug, info};
use thiserror::Error;

use crate::edges::{
    EdgeTag, ExpandedTable, Node, ReactionKey, ReactionRow, ReactionTable, SimpleEdge, VirtualNode,
};

/// Expand every row of a reaction table into simple edges
///
/// # Parameters
/// - `table`: Reaction table, raw or completed with source/sink rows
///
/// # Returns
/// - `Ok`: Table of simple edges in row order, along with the virtual nodes introduced. A hyperedge
///     with `a` substrates and `b` products yields `2ab` edges (`4ab` if reversible) through one
///     virtual node of its own.
/// - `Err`: [`ExpansionError::MalformedRow`] if a row has no substrates or no products
///
/// # Examples
/// ```rust
/// use ubergraph_core::edges::{ReactionRow, ReactionTable};
/// use ubergraph_core::expansion::expand;
/// use ubergraph_core::pathway::reaction::Reversibility;
/// let table = ReactionTable::from(vec![ReactionRow::reaction(
///     "rn:R00200",
///     &["1", "2"],
///     &["3", "4"],
///     Reversibility::Irreversible,
/// )]);
/// let expanded = expand(&table).unwrap();
/// assert_eq!(expanded.len(), 8);
/// assert_eq!(expanded.virtual_nodes.len(), 1);
/// ```
pub fn expand(table: &ReactionTable) -> Result<ExpandedTable, ExpansionError> {
    let mut expanded = ExpandedTable::default();
    for (index, row) in table.iter().enumerate() {
        expand_row(index, row, &mut expanded)?;
    }
    info!(
        "Expanded {} reactions into {} edges with {} virtual nodes",
        table.len(),
        expanded.edges.len(),
        expanded.virtual_nodes.len()
    );
    Ok(expanded)
}

/// Expand a single row, `index` is the row's position in its table
fn expand_row(
    index: usize,
    row: &ReactionRow,
    expanded: &mut ExpandedTable,
) -> Result<(), ExpansionError> {
    if row.is_malformed() {
        return Err(ExpansionError::MalformedRow(row.reaction.clone()));
    }
    let is_hyper = row.is_hyper();
    let reversible = row.is_reversible();
    let tag = EdgeTag {
        kind: row.kind,
        is_hyper,
    };
    let mut push = |source: &Node, target: &Node| {
        expanded.edges.push(SimpleEdge {
            reaction: row.reaction.clone(),
            source: source.clone(),
            target: target.clone(),
            tag,
        })
    };

    if !is_hyper {
        let (substrate, product) = (&row.substrates[0], &row.products[0]);
        push(substrate, product);
        if reversible {
            push(product, substrate);
        }
        return Ok(());
    }

    let junction = Node::Virtual(VirtualNode {
        reaction_index: index,
    });
    for leading in &row.substrates {
        for trailing in &row.products {
            push(leading, &junction);
            push(&junction, trailing);
            if reversible {
                push(&junction, leading);
                push(trailing, &junction);
            }
        }
    }
    debug!(
        "Hyperedge {} routed through h{} ({} substrates, {} products)",
        row.reaction,
        index,
        row.substrates.len(),
        row.products.len()
    );
    expanded.virtual_nodes.push(VirtualNode {
        reaction_index: index,
    });
    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpansionError {
    #[error("Reaction {0} has no substrates or no products")]
    MalformedRow(ReactionKey),
}
