//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the lookup client
//! and the enrichment service. The library never reads environment variables while a run is
//! in progress; the `*_from_env_value` helpers take the raw `Option<String>` so binaries and
//! tests decide where values come from.

use crate::constants::{
    DEFAULT_LOOKUP_BASE_URL, DEFAULT_MAX_LIST, DEFAULT_PRIORITY_TRIGGERS, DEFAULT_TIMEOUT_SECS,
    MAX_LIST_LIMIT,
};
use crate::priority::PriorityRules;
use crate::{EnrichError, EnrichResult};
use std::str::FromStr;
use std::time::Duration;

/// What to do when a single code maps to more than one description.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Abort the whole run with `EnrichError::AmbiguousMapping`.
    #[default]
    Fail,
    /// Take the first match the service reported and keep going.
    FirstMatch,
}

impl FromStr for AmbiguityPolicy {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(AmbiguityPolicy::Fail),
            "first-match" | "first_match" | "first" => Ok(AmbiguityPolicy::FirstMatch),
            other => Err(EnrichError::InvalidInput(format!(
                "unknown ambiguity policy '{other}' (expected 'fail' or 'first-match')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    lookup_base_url: String,
    max_list: u32,
    timeout: Duration,
    priority_rules: PriorityRules,
    ambiguity_policy: AmbiguityPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::InvalidInput` if:
    /// - the base URL is not an `http://` or `https://` address,
    /// - `max_list` is zero or above the service limit,
    /// - `max_list` is below 2 while ambiguous mappings are meant to fail (a single
    ///   candidate can never reveal a second match).
    pub fn new(
        lookup_base_url: impl Into<String>,
        max_list: u32,
        timeout: Duration,
        priority_rules: PriorityRules,
        ambiguity_policy: AmbiguityPolicy,
    ) -> EnrichResult<Self> {
        let lookup_base_url = lookup_base_url.into().trim().to_string();
        if !(lookup_base_url.starts_with("http://") || lookup_base_url.starts_with("https://")) {
            return Err(EnrichError::InvalidInput(format!(
                "lookup base URL must start with http:// or https://, got '{lookup_base_url}'"
            )));
        }

        if max_list == 0 || max_list > MAX_LIST_LIMIT {
            return Err(EnrichError::InvalidInput(format!(
                "max list must be between 1 and {MAX_LIST_LIMIT}, got {max_list}"
            )));
        }

        if max_list < 2 && ambiguity_policy == AmbiguityPolicy::Fail {
            return Err(EnrichError::InvalidInput(
                "max list must be at least 2 to detect ambiguous mappings".into(),
            ));
        }

        Ok(Self {
            lookup_base_url,
            max_list,
            timeout,
            priority_rules,
            ambiguity_policy,
        })
    }

    pub fn lookup_base_url(&self) -> &str {
        &self.lookup_base_url
    }

    pub fn max_list(&self) -> u32 {
        self.max_list
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn priority_rules(&self) -> &PriorityRules {
        &self.priority_rules
    }

    pub fn ambiguity_policy(&self) -> AmbiguityPolicy {
        self.ambiguity_policy
    }

    /// Build a configuration from raw environment values.
    ///
    /// Each argument is the unparsed value of the matching `ICD_*` variable (see
    /// [`crate::constants`]). Missing or blank values fall back to the defaults.
    pub fn from_env_values(
        base_url: Option<String>,
        max_list: Option<String>,
        timeout_secs: Option<String>,
        triggers: Option<String>,
        ambiguity_policy: Option<String>,
    ) -> EnrichResult<Self> {
        let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_LOOKUP_BASE_URL.into());
        let max_list = parse_number(max_list, "max list")?.unwrap_or(DEFAULT_MAX_LIST);
        let timeout_secs = parse_number(timeout_secs, "timeout")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let priority_rules = priority_rules_from_env_value(triggers)?;
        let ambiguity_policy = non_blank(ambiguity_policy)
            .map(|v| v.parse::<AmbiguityPolicy>())
            .transpose()?
            .unwrap_or_default();

        Self::new(
            base_url,
            max_list,
            Duration::from_secs(timeout_secs),
            priority_rules,
            ambiguity_policy,
        )
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.into(),
            max_list: DEFAULT_MAX_LIST,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            priority_rules: PriorityRules::default(),
            ambiguity_policy: AmbiguityPolicy::Fail,
        }
    }
}

/// Parse the priority trigger list from an optional comma-separated value.
///
/// If `value` is `None` or empty/whitespace, returns the default triggers.
pub fn priority_rules_from_env_value(value: Option<String>) -> EnrichResult<PriorityRules> {
    match non_blank(value) {
        Some(v) => PriorityRules::new(v.split(',')),
        None => PriorityRules::new(DEFAULT_PRIORITY_TRIGGERS.iter().copied()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(value: Option<String>, what: &str) -> EnrichResult<Option<T>> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| EnrichError::InvalidInput(format!("{what} must be a number, got '{v}'")))
        })
        .transpose()
}
