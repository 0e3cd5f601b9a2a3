use std::env;

use tracing::debug;

use crate::errors::{ConfigError, CoreError};
use crate::job_spec::OpenshiftJobSpec;

/// CI job configuration shared across the e2e tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiConfig {
    pub repo_name: String,
    pub job_name: String,
    /// Free-form job type such as `periodic`, `presubmit` or `postsubmit`.
    pub job_type: String,
    pub dry_run: bool,
    pub component_image_tag: String,
    pub component_env_var_prefix: String,
    pub tekton_event_type: String,
    pub job_spec: Option<OpenshiftJobSpec>,
}

impl CiConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix("")
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `E2E_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|suffix| env::var(format!("{prefix}{suffix}")).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let dry_run = match lookup("DRY_RUN") {
            Some(raw) => parse_bool("DRY_RUN", &raw)?,
            None => false,
        };

        let job_spec = match lookup("JOB_SPEC") {
            Some(raw) if !raw.trim().is_empty() => Some(OpenshiftJobSpec::parse(&raw)?),
            _ => None,
        };

        let mut repo_name = var("REPO_NAME");
        if repo_name.is_empty() {
            if let Some(spec) = &job_spec {
                repo_name = spec.refs.repo.clone();
            }
        }

        debug!(repo = %repo_name, has_job_spec = job_spec.is_some(), "loaded CI configuration");

        Ok(Self {
            repo_name,
            job_name: var("JOB_NAME"),
            job_type: var("JOB_TYPE"),
            dry_run,
            component_image_tag: var("COMPONENT_IMAGE_TAG"),
            component_env_var_prefix: var("COMPONENT_ENV_VAR_PREFIX"),
            tekton_event_type: var("TEKTON_EVENT_TYPE"),
            job_spec,
        })
    }

    /// Whether the job runs on a schedule rather than for a pull request.
    pub fn is_periodic(&self) -> bool {
        self.job_type == "periodic"
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Helper that loads config and converts to the canonical core error type.
pub fn load_ci_config() -> Result<CiConfig, CoreError> {
    Ok(CiConfig::from_env()?)
}
