// SPDX-License-Identifier: MIT
//! Analyzer registry and the enabled/disabled toggle map.
//!
//! The registry is assembled once at startup by the embedder — however it
//! loads its analyzers — and injected into the dispatcher. Resolution is a
//! pure query; registration order is the stable tie-break order the
//! dispatcher sees.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analyzer::{Analyzer, AnalyzerDescriptor, AnalyzerId};
use crate::artifact::ArtifactKind;

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two analyzers with one id would make the `(id, target)` dedup key
    /// ambiguous.
    #[error("analyzer id already registered: {0}")]
    DuplicateId(AnalyzerId),
}

// ── AnalyzerRegistry ─────────────────────────────────────────────────────────

/// All analyzers known to a run, in registration order.
#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        AnalyzerRegistry::default()
    }

    /// Register an analyzer. Ids must be unique.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) -> Result<(), RegistryError> {
        let id = &analyzer.descriptor().id;
        if self.get(id).is_some() {
            return Err(RegistryError::DuplicateId(id.clone()));
        }
        tracing::debug!(analyzer = %id, role = %analyzer.descriptor().role, "analyzer registered");
        self.analyzers.push(analyzer);
        Ok(())
    }

    /// Every registered analyzer, in registration order.
    pub fn all(&self) -> &[Arc<dyn Analyzer>] {
        &self.analyzers
    }

    /// Every analyzer whose declared role is `kind`, in registration order.
    pub fn for_kind(&self, kind: ArtifactKind) -> Vec<Arc<dyn Analyzer>> {
        self.analyzers
            .iter()
            .filter(|a| a.descriptor().role == kind)
            .cloned()
            .collect()
    }

    /// Look up one analyzer by id.
    pub fn get(&self, id: &AnalyzerId) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.iter().find(|a| &a.descriptor().id == id)
    }

    /// Metadata for every registered analyzer — listing UIs consume this
    /// without touching executable state.
    pub fn descriptors(&self) -> Vec<&AnalyzerDescriptor> {
        self.analyzers.iter().map(|a| a.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

// ── EnabledAnalyzers ─────────────────────────────────────────────────────────

/// Per-analyzer on/off toggles, owned and persisted by the embedder.
///
/// The dispatcher only reads it. Ids with no entry count as enabled, so a
/// fresh (empty) map runs everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledAnalyzers {
    toggles: HashMap<AnalyzerId, bool>,
}

impl EnabledAnalyzers {
    pub fn new() -> Self {
        EnabledAnalyzers::default()
    }

    pub fn is_enabled(&self, id: &AnalyzerId) -> bool {
        self.toggles.get(id).copied().unwrap_or(true)
    }

    pub fn set_enabled(&mut self, id: AnalyzerId, enabled: bool) {
        self.toggles.insert(id, enabled);
    }
}
