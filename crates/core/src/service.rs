//! Enrichment service.
//!
//! Bundles the resolved configuration with a lookup implementation so callers (the binaries,
//! tests) do not have to thread both through every call.

use crate::assemble::assemble;
use crate::lookup::{resolve, CachingLookup, ClinicalTablesClient, CodeLookup, Resolution};
use crate::patient::{classify_patient, Patient, PatientResult};
use crate::{CoreConfig, DiagnosisCode, EnrichResult};
use std::sync::Arc;

/// Pure enrichment operations - no presentation concerns
pub struct EnrichmentService<L> {
    cfg: Arc<CoreConfig>,
    lookup: L,
    dedupe: bool,
}

impl EnrichmentService<ClinicalTablesClient> {
    /// Creates a service that talks to the configured Clinical Tables endpoint.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::HttpClient` if the HTTP client cannot be built.
    pub fn connect(cfg: Arc<CoreConfig>) -> EnrichResult<Self> {
        let client = ClinicalTablesClient::new(&cfg)?;
        Ok(Self::new(cfg, client))
    }
}

impl<L: CodeLookup> EnrichmentService<L> {
    /// Creates a new instance of EnrichmentService.
    ///
    /// Lookups are deduplicated within each [`assemble`](Self::assemble) call by default.
    pub fn new(cfg: Arc<CoreConfig>, lookup: L) -> Self {
        Self {
            cfg,
            lookup,
            dedupe: true,
        }
    }

    /// Turn per-run lookup deduplication on or off.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Look up a single code and classify it, without applying the ambiguity policy.
    pub fn resolve_code(&self, code: &DiagnosisCode) -> EnrichResult<Resolution> {
        resolve(&self.lookup, code)
    }

    /// Enrich a single patient.
    pub fn classify(&self, patient: &Patient) -> EnrichResult<PatientResult> {
        classify_patient(patient, &self.lookup, &self.cfg)
    }

    /// Enrich all patients and order them by descending priority count.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (service failure, protocol mismatch, ambiguous mapping).
    /// No partial results are returned.
    pub fn assemble(&self, patients: &[Patient]) -> EnrichResult<Vec<PatientResult>> {
        tracing::info!(
            "enriching {} patients (dedupe: {})",
            patients.len(),
            self.dedupe
        );

        if self.dedupe {
            let cached = CachingLookup::new(&self.lookup);
            let results = assemble(patients, &cached, &self.cfg)?;
            tracing::debug!("{} distinct terms looked up", cached.cached_terms());
            Ok(results)
        } else {
            assemble(patients, &self.lookup, &self.cfg)
        }
    }
}
