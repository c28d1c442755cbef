//! Procedure engine

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tss_core::{TssError, TssResult};

use crate::{Procedure, ProcedureCatalog, ProcedureStatusReport};

/// Catalog listing entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcedureSummary {
    pub id: String,
    /// Falls back to the id when the catalog has no title
    pub title: String,
}

/// Read-only access to the catalog and status evaluation
#[derive(Clone, Debug, Default)]
pub struct ProcedureEngine {
    catalog: ProcedureCatalog,
}

impl ProcedureEngine {
    pub fn new(catalog: ProcedureCatalog) -> Self {
        ProcedureEngine { catalog }
    }

    /// Load the catalog file; any failure is fatal for the caller
    pub fn load(path: impl AsRef<Path>) -> TssResult<Self> {
        let catalog = ProcedureCatalog::load(path.as_ref())?;
        tracing::info!(
            "loaded {} procedures from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(Self::new(catalog))
    }

    pub fn catalog(&self) -> &ProcedureCatalog {
        &self.catalog
    }

    /// Procedures of `namespace` in catalog order; unknown namespace is empty
    pub fn list(&self, namespace: &str) -> Vec<ProcedureSummary> {
        self.catalog
            .namespace(namespace)
            .into_iter()
            .flat_map(|ns| ns.iter())
            .map(|(id, proc)| ProcedureSummary {
                id: id.to_string(),
                title: proc.title.clone().unwrap_or_else(|| id.to_string()),
            })
            .collect()
    }

    pub fn get(&self, namespace: &str, id: &str) -> TssResult<&Procedure> {
        self.catalog
            .namespace(namespace)
            .and_then(|ns| ns.get(id))
            .ok_or_else(|| TssError::ProcedureNotFound(id.to_string()))
    }

    /// Evaluate every step of a procedure against `state`, the `{eva, ltv}` root
    pub fn status(
        &self,
        namespace: &str,
        id: &str,
        state: &Value,
    ) -> TssResult<ProcedureStatusReport> {
        let procedure = self.get(namespace, id)?;
        Ok(ProcedureStatusReport::evaluate(id, procedure, state))
    }
}
