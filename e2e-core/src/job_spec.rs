use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Job metadata injected by OpenShift CI through the `JOB_SPEC` variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenshiftJobSpec {
    #[serde(default)]
    pub refs: Refs,
}

/// Git references of the job under test.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Refs {
    #[serde(default)]
    pub repo_link: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default, rename = "org")]
    pub organization: String,
    #[serde(default)]
    pub pulls: Vec<Pull>,
}

/// A pull request participating in the job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pull {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default, rename = "link")]
    pub pr_link: String,
    #[serde(default)]
    pub author_link: String,
}

impl OpenshiftJobSpec {
    /// Parses the raw `JOB_SPEC` JSON document.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJobSpec { source })
    }

    /// The first pull request of the job, if any.
    pub fn primary_pull(&self) -> Option<&Pull> {
        self.refs.pulls.first()
    }
}
