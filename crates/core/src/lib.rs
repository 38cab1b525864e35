//! # ICD Core
//!
//! Core logic for enriching patient diagnosis lists with ICD-10 descriptions.
//!
//! The pipeline is a single forward pass:
//! - look up each code against an ICD-10 search service ([`lookup`])
//! - classify codes per patient as resolved, priority or malformed ([`patient`])
//! - order patients by their number of priority diagnoses ([`assemble`])
//!
//! **No presentation concerns**: argument parsing, output formatting and logging setup belong
//! in the binaries.

pub mod assemble;
pub mod code;
pub mod config;
pub mod constants;
pub mod description;
pub mod error;
pub mod input;
pub mod lookup;
pub mod patient;
pub mod priority;
pub mod service;

#[cfg(test)]
mod test_support;

pub use assemble::{assemble, sort_by_priority, RunSummary};
pub use code::DiagnosisCode;
pub use config::{AmbiguityPolicy, CoreConfig};
pub use description::{Description, DescriptionError};
pub use error::{EnrichError, EnrichResult};
pub use input::{load_patients, sample_patients};
pub use lookup::{CodeLookup, CodeMatch, LookupResult, Resolution};
pub use patient::{classify_patient, Patient, PatientResult};
pub use priority::PriorityRules;
pub use service::EnrichmentService;
