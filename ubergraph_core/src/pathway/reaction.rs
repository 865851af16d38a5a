//! This module provides a struct for representing reactions
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::split_names;

/// Represents a reaction of the pathway
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Space separated list of reaction names
    #[builder(default = "String::new()")]
    #[serde(default)]
    pub name: String,
    /// Ids of the substrate compounds, in source order
    #[builder(default = "Vec::new()")]
    pub substrates: Vec<String>,
    /// Ids of the product compounds, in source order
    #[builder(default = "Vec::new()")]
    pub products: Vec<String>,
    /// Whether the reaction can run in both directions
    #[builder(default = "Reversibility::Irreversible")]
    #[serde(rename = "type")]
    pub reversibility: Reversibility,
}

impl Reaction {
    /// Each name of the reaction, in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        split_names(&self.name)
    }

    /// A reaction is a hyperedge when it has more than one substrate or more than one product
    pub fn is_hyper(&self) -> bool {
        self.substrates.len() > 1 || self.products.len() > 1
    }

    pub fn is_reversible(&self) -> bool {
        self.reversibility == Reversibility::Reversible
    }
}

/// Direction(s) in which a reaction can carry flux
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reversibility {
    /// The reaction can run from products back to substrates
    Reversible,
    /// The reaction only runs from substrates to products
    Irreversible,
}

impl Display for Reversibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Reversibility::Reversible => write!(f, "reversible"),
            Reversibility::Irreversible => write!(f, "irreversible"),
        }
    }
}

impl FromStr for Reversibility {
    type Err = ReversibilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reversible" => Ok(Reversibility::Reversible),
            "irreversible" => Ok(Reversibility::Irreversible),
            other => Err(ReversibilityParseError(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown reaction type {0}, expected reversible or irreversible")]
pub struct ReversibilityParseError(pub String);
