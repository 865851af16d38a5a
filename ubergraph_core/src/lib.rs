//! Core rust implementation of Ubergraph, a crate for building hypergraph models of metabolic
//! pathways and weighting their reactions with gene perturbation data.
//!
//! The pipeline runs from a [`pathway::network::PathwayNetwork`] through the gene/reaction
//! [`crossref`], [`expansion`] of hyperedges, [`completion`] with sources and sinks, and
//! [`uberedge`] determination, to the flux matrix of [`stoichiometry`].

pub mod completion;
pub mod configuration;
pub mod crossref;
pub mod edges;
pub mod expansion;
pub mod hypergraph;
pub mod io;
pub mod pathway;
pub mod perturbation;
pub mod scores;
pub mod stoichiometry;
pub mod uberedge;
