//! Research-access seam.
//!
//! Real documentation scraping lives outside this crate. The core only
//! consumes the already-resolved shape (sources, extracted content, and a
//! completeness fraction) through a synchronous provider trait, and gates
//! the pipeline on completeness before anything downstream runs.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Resolved research results handed to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchBundle {
    /// Fraction of required sources successfully accessed, in [0,1]
    pub completeness: f64,

    /// Source names that were accessed
    pub sources: Vec<String>,

    /// Source name → extracted documentation text
    #[serde(default)]
    pub extracted_content: BTreeMap<String, String>,
}

/// Synchronous supplier of research results.
///
/// Implementations may block internally (HTTP, files); the core never
/// defines timeouts or retries for them.
pub trait ResearchProvider {
    fn gather(&self) -> Result<ResearchBundle>;
}

/// Offline provider backed by a fixed source list.
///
/// Stands in for the external research collaborator; `completeness` is
/// injectable so callers can exercise the precondition gate.
pub struct StaticResearch {
    completeness: f64,
}

impl StaticResearch {
    pub fn new(completeness: f64) -> Self {
        Self { completeness }
    }
}

impl Default for StaticResearch {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ResearchProvider for StaticResearch {
    fn gather(&self) -> Result<ResearchBundle> {
        let sources = vec![
            "Add-in API Reference".to_string(),
            "Scripting Guide".to_string(),
            "Host Platform SDK Documentation".to_string(),
            "Extension Gallery Index".to_string(),
        ];

        let extracted_content = sources
            .iter()
            .map(|s| (s.clone(), format!("offline snapshot of {s}")))
            .collect();

        Ok(ResearchBundle {
            completeness: self.completeness,
            sources,
            extracted_content,
        })
    }
}
