use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icd_core::constants::{
    ENV_AMBIGUITY_POLICY, ENV_LOOKUP_BASE_URL, ENV_LOOKUP_MAX_LIST, ENV_LOOKUP_TIMEOUT_SECS,
    ENV_PATIENTS_FILE, ENV_PRIORITY_TRIGGERS,
};
use icd_core::{CoreConfig, EnrichmentService, RunSummary, load_patients, sample_patients};

/// Main entry point for the ICD enrichment run
///
/// Enriches a patient list against the Clinical Tables ICD-10-CM service and prints the
/// results, sorted by priority diagnosis count, as JSON on stdout. Logs go to stderr.
///
/// # Environment Variables
/// - `ICD_LOOKUP_BASE_URL`: search endpoint (default: Clinical Tables ICD-10-CM v3)
/// - `ICD_LOOKUP_MAX_LIST`: candidates requested per code (default: 2)
/// - `ICD_LOOKUP_TIMEOUT_SECS`: HTTP timeout per lookup (default: 30)
/// - `ICD_PRIORITY_TRIGGERS`: comma-separated priority substrings (default: "covid,respiratory failure")
/// - `ICD_AMBIGUITY_POLICY`: "fail" or "first-match" (default: "fail")
/// - `ICD_PATIENTS_FILE`: JSON/YAML patient list (default: built-in sample patients)
///
/// # Returns
/// * `Ok(())` - If every patient was enriched and printed
/// * `Err(anyhow::Error)` - On configuration, input, or fatal lookup errors
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("icd_core=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var(ENV_LOOKUP_BASE_URL).ok(),
        std::env::var(ENV_LOOKUP_MAX_LIST).ok(),
        std::env::var(ENV_LOOKUP_TIMEOUT_SECS).ok(),
        std::env::var(ENV_PRIORITY_TRIGGERS).ok(),
        std::env::var(ENV_AMBIGUITY_POLICY).ok(),
    )?;

    let patients = match std::env::var(ENV_PATIENTS_FILE).ok().filter(|v| !v.trim().is_empty()) {
        Some(path) => {
            let path = PathBuf::from(path);
            tracing::info!("++ Loading patients from {}", path.display());
            load_patients(&path)?
        }
        None => {
            tracing::info!("++ Using built-in sample patients");
            sample_patients()
        }
    };

    tracing::info!("++ Looking up codes at {}", cfg.lookup_base_url());

    let service = EnrichmentService::connect(Arc::new(cfg))?;
    let results = match service.assemble(&patients) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Enrichment failed: {}", e);
            return Err(e.into());
        }
    };

    let summary = RunSummary::from_results(&results);
    tracing::info!(
        "++ Done: {} patients, {} resolved, {} priority, {} malformed",
        summary.patients,
        summary.resolved,
        summary.priority,
        summary.malformed
    );

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
