//! Module for reading and writing pathways, measurement tables, and edge tables
pub mod json;
