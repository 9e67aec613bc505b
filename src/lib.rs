//! Client side of a molecular similarity screen: submit a query SMILES, rank the hits, show the
//! selected one in 3D, and optionally ask a text-generation API to describe it.
//!
//! Network calls are blocking, and made with a shared `ureq` agent configuration.

use std::{io, time::Duration};

#[cfg(feature = "encode")]
use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::*;
use thiserror::Error;
use ureq::Agent;

pub mod app;
pub mod catalog;
pub mod config;
pub mod hit_list;
pub mod insight;
pub mod pubchem;
pub mod screening;
pub mod state;
pub mod viewer;

pub use app::App;
pub use config::Config;
pub use screening::{ScreenError, ScreeningClient};
pub use state::MoleculeStore;

// Workraound for not being able to construct ureq's errors.
#[derive(Debug, Error)]
pub enum ReqError {
    #[error("HTTP request failed")]
    Http,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Serialization error: {0}")]
    Ser(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ureq::Error> for ReqError {
    fn from(_err: ureq::Error) -> Self {
        Self::Http
    }
}

const HTTP_TIMEOUT: u64 = 20; // In seconds

fn make_agent() -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT)))
        // Don't cause 404 and similar error HTTP codes to throw errors; callers check the status.
        .http_status_as_error(false)
        .build();

    config.into()
}

/// A screening hit, or a query. Identity for selection purposes is the SMILES string, not the name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "encode", derive(Encode, Decode))]
pub struct Molecule {
    pub name: String,
    #[serde(alias = "structure")]
    pub smiles: String,
    /// Similarity to the query, in [0, 1]. This is a display convention; not enforced.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub score: f64,
    /// 3D coordinates, as the text of an SDF (V2000 molfile) block.
    #[serde(
        rename = "mol3d",
        alias = "structure3d",
        default,
        deserialize_with = "deserialize_sdf",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdf: Option<String>,
}

impl Molecule {
    pub fn new(name: &str, smiles: &str, score: f64) -> Self {
        Self {
            name: name.to_owned(),
            smiles: smiles.to_owned(),
            score,
            sdf: None,
        }
    }

    /// Two molecules are the same for display purposes if their SMILES strings match.
    pub fn same_structure(&self, other: &Self) -> bool {
        self.smiles == other.smiles
    }
}

/// The backend sends an empty string instead of omitting the field when it has no 3D data.
fn deserialize_sdf<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(deserializer)?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

/// Hits, in rank order. Index 0 is the top hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "encode", derive(Encode, Decode))]
pub struct ScreeningResult {
    pub hits: Vec<Molecule>,
}

impl ScreeningResult {
    pub fn is_sorted_desc(&self) -> bool {
        self.hits.windows(2).all(|w| w[0].score >= w[1].score)
    }

    /// Stable sort, highest score first.
    pub fn sort_desc(&mut self) {
        self.hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
}
