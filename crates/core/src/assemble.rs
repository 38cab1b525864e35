//! Result assembly: classify every patient, then order by priority.

use crate::lookup::CodeLookup;
use crate::patient::{classify_patient, Patient, PatientResult};
use crate::{CoreConfig, EnrichResult};
use serde::Serialize;
use std::cmp::Reverse;

/// Counts across one assembled run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub patients: usize,
    pub resolved: usize,
    pub priority: usize,
    pub malformed: usize,
}

impl RunSummary {
    pub fn from_results(results: &[PatientResult]) -> Self {
        results.iter().fold(Self::default(), |acc, r| Self {
            patients: acc.patients + 1,
            resolved: acc.resolved + r.diagnoses.len(),
            priority: acc.priority + r.priority_diagnoses.len(),
            malformed: acc.malformed + r.malformed_diagnoses.len(),
        })
    }
}

/// Classify every patient in input order, then sort by descending priority count.
///
/// The sort is stable, so patients with equal counts keep their input order. Any fatal error
/// aborts the run and no partial results are returned.
pub fn assemble<L: CodeLookup + ?Sized>(
    patients: &[Patient],
    lookup: &L,
    cfg: &CoreConfig,
) -> EnrichResult<Vec<PatientResult>> {
    let mut results = patients
        .iter()
        .map(|patient| classify_patient(patient, lookup, cfg))
        .collect::<EnrichResult<Vec<_>>>()?;

    sort_by_priority(&mut results);

    let summary = RunSummary::from_results(&results);
    tracing::info!(
        patients = summary.patients,
        resolved = summary.resolved,
        priority = summary.priority,
        malformed = summary.malformed,
        "assembled patient results"
    );

    Ok(results)
}

/// Stable sort by descending number of priority diagnoses.
pub fn sort_by_priority(results: &mut [PatientResult]) {
    results.sort_by_key(|r| Reverse(r.priority_count()));
}
