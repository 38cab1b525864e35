use clap::{Args, Parser, Subcommand};
use icd_core::constants::{DEFAULT_LOOKUP_BASE_URL, DEFAULT_MAX_LIST, DEFAULT_TIMEOUT_SECS};
use icd_core::lookup::{ClinicalTablesClient, StaticLookup};
use icd_core::{
    load_patients, sample_patients, AmbiguityPolicy, CodeLookup, CoreConfig, DiagnosisCode,
    EnrichError, EnrichmentService, Patient, PriorityRules, Resolution,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "icd")]
#[command(about = "Enrich patient diagnosis codes with ICD-10 descriptions")]
struct Cli {
    #[command(flatten)]
    lookup: LookupArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct LookupArgs {
    /// Lookup service search endpoint
    #[arg(long, global = true, env = "ICD_LOOKUP_BASE_URL", default_value = DEFAULT_LOOKUP_BASE_URL)]
    base_url: String,
    /// Candidate matches requested per code
    #[arg(long, global = true, env = "ICD_LOOKUP_MAX_LIST", default_value_t = DEFAULT_MAX_LIST)]
    max_list: u32,
    /// HTTP timeout per lookup, in seconds
    #[arg(long, global = true, env = "ICD_LOOKUP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Priority trigger substring (repeatable or comma-separated; defaults to "covid" and "respiratory failure")
    #[arg(long = "trigger", global = true, env = "ICD_PRIORITY_TRIGGERS", value_delimiter = ',')]
    triggers: Vec<String>,
    /// What to do when a code matches more than one description: "fail" or "first-match"
    #[arg(long, global = true, env = "ICD_AMBIGUITY_POLICY", default_value = "fail", value_parser = parse_policy)]
    ambiguity_policy: AmbiguityPolicy,
    /// Shorthand for --ambiguity-policy first-match
    #[arg(long, global = true)]
    first_match: bool,
    /// Answer lookups from a JSON fixture file instead of the lookup service
    #[arg(long, global = true, conflicts_with = "offline")]
    fixture: Option<PathBuf>,
    /// Answer lookups from the built-in sample fixture instead of the lookup service
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich patients and print the sorted results as JSON
    Run {
        /// JSON or YAML patient list (defaults to the built-in sample patients)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Look up every code, even when it repeats
        #[arg(long)]
        no_cache: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Look up a single code and print its classification
    Lookup {
        /// Code to search for
        code: String,
    },
    /// Print the built-in sample patients as JSON
    Sample,
}

impl LookupArgs {
    fn config(&self) -> Result<CoreConfig, Box<dyn std::error::Error>> {
        // An unset or blank ICD_PRIORITY_TRIGGERS means the default triggers, as in the runner.
        let rules = if self.triggers.iter().all(|t| t.trim().is_empty()) {
            PriorityRules::default()
        } else {
            PriorityRules::new(&self.triggers)?
        };
        let policy = if self.first_match {
            AmbiguityPolicy::FirstMatch
        } else {
            self.ambiguity_policy
        };

        Ok(CoreConfig::new(
            self.base_url.clone(),
            self.max_list,
            Duration::from_secs(self.timeout_secs),
            rules,
            policy,
        )?)
    }

    fn lookup(&self, cfg: &CoreConfig) -> Result<Box<dyn CodeLookup>, Box<dyn std::error::Error>> {
        if let Some(path) = &self.fixture {
            return Ok(Box::new(StaticLookup::load(path)?));
        }
        if self.offline {
            return Ok(Box::new(StaticLookup::icd10_sample()));
        }
        Ok(Box::new(ClinicalTablesClient::new(cfg)?))
    }
}

fn parse_policy(value: &str) -> Result<AmbiguityPolicy, EnrichError> {
    if value.trim().is_empty() {
        return Ok(AmbiguityPolicy::default());
    }
    value.parse()
}

fn read_patients(input: Option<&Path>) -> Result<Vec<Patient>, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(load_patients(path)?),
        None => Ok(sample_patients()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            input,
            no_cache,
            pretty,
        }) => {
            let cfg = cli.lookup.config()?;
            let lookup = cli.lookup.lookup(&cfg)?;
            let patients = read_patients(input.as_deref())?;
            let service = EnrichmentService::new(Arc::new(cfg), lookup).with_dedupe(!no_cache);

            match service.assemble(&patients) {
                Ok(results) => {
                    let out = if pretty {
                        serde_json::to_string_pretty(&results)?
                    } else {
                        serde_json::to_string(&results)?
                    };
                    println!("{}", out);
                }
                Err(e) => {
                    eprintln!("Error enriching patients: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Lookup { code }) => {
            let cfg = cli.lookup.config()?;
            let lookup = cli.lookup.lookup(&cfg)?;
            let service = EnrichmentService::new(Arc::new(cfg), lookup);

            match service.resolve_code(&DiagnosisCode::from(code.as_str())) {
                Ok(Resolution::Malformed) => println!("{}: malformed (no match)", code),
                Ok(Resolution::Resolved(found)) => {
                    println!("{}: resolved: {}", code, found.description)
                }
                Ok(Resolution::Ambiguous { total, matches }) => {
                    println!("{}: ambiguous: {} matches", code, total);
                    for m in matches {
                        println!("  {} {}", m.code, m.description);
                    }
                }
                Err(e) => {
                    eprintln!("Error looking up {}: {}", code, e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Sample) => {
            println!("{}", serde_json::to_string_pretty(&sample_patients())?);
        }
        None => {
            println!("Use 'icd --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(args: &[&str]) -> CoreConfig {
        let cli = Cli::try_parse_from(args).expect("parse args");
        cli.lookup.config().expect("config")
    }

    #[test]
    fn test_flags_set_policy_and_triggers() {
        let cfg = config_from(&[
            "icd",
            "--first-match",
            "--trigger",
            "Sepsis",
            "--trigger",
            "stroke,kidney",
            "run",
        ]);
        assert_eq!(cfg.ambiguity_policy(), AmbiguityPolicy::FirstMatch);
        assert_eq!(
            cfg.priority_rules().triggers(),
            &["sepsis".to_string(), "stroke".to_string(), "kidney".to_string()]
        );
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(Cli::try_parse_from(["icd", "--ambiguity-policy", "pick-any", "run"]).is_err());
    }

    // The only test that touches ICD_* variables; the others pass every value they assert on.
    #[test]
    fn test_env_configures_policy_and_triggers() {
        std::env::set_var("ICD_AMBIGUITY_POLICY", "first-match");
        std::env::set_var("ICD_PRIORITY_TRIGGERS", "Kidney, sepsis");
        let from_env = config_from(&["icd", "run"]);
        let overridden = config_from(&[
            "icd",
            "--ambiguity-policy",
            "fail",
            "--trigger",
            "covid",
            "run",
        ]);

        std::env::set_var("ICD_AMBIGUITY_POLICY", "");
        std::env::set_var("ICD_PRIORITY_TRIGGERS", "");
        let blank_env = config_from(&["icd", "run"]);

        std::env::remove_var("ICD_AMBIGUITY_POLICY");
        std::env::remove_var("ICD_PRIORITY_TRIGGERS");
        let unset = config_from(&["icd", "run"]);

        assert_eq!(from_env.ambiguity_policy(), AmbiguityPolicy::FirstMatch);
        assert_eq!(
            from_env.priority_rules().triggers(),
            &["kidney".to_string(), "sepsis".to_string()]
        );
        assert!(!from_env.priority_rules().matches("COVID-19"));

        assert_eq!(overridden.ambiguity_policy(), AmbiguityPolicy::Fail);
        assert_eq!(overridden.priority_rules().triggers(), &["covid".to_string()]);

        for cfg in [blank_env, unset] {
            assert_eq!(cfg.ambiguity_policy(), AmbiguityPolicy::Fail);
            assert_eq!(cfg.priority_rules(), &PriorityRules::default());
        }
    }
}
