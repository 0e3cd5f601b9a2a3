use std::collections::HashMap;

use e2e_core::{CiConfig, TestRunnerConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::files::ChangedFiles;

/// Mutable state threaded through one engine invocation.
///
/// Conditions and actions receive the same instance by mutable reference, in
/// sequence. The engine itself only reads and writes `dry_run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext {
    /// Settings for the external test runner, owned by actions.
    pub runner: TestRunnerConfig,
    /// Free-form data passed between rules. The engine never interprets it.
    pub rule_data: HashMap<String, Value>,
    pub repo_name: String,
    pub component_image_tag: String,
    pub component_env_var_prefix: String,
    pub job_name: String,
    /// Free-form job type; callers compare against values such as `periodic`.
    pub job_type: String,
    pub diff_files: ChangedFiles,
    /// Pairing indicator kept as text: `"true"` or `"false"`.
    pub is_paired: String,
    pub required_binaries: Vec<String>,
    pub pr_remote_name: String,
    pub pr_commit_sha: String,
    pub pr_branch_name: String,
    pub tekton_event_type: String,
    pub requires_multi_platform_tests: bool,
    pub requires_spray_proxy_registering: bool,
    pub dry_run: bool,
}

impl RuleContext {
    /// Creates a context with the defaults existing rule content relies on.
    pub fn new() -> Self {
        Self {
            runner: TestRunnerConfig::default(),
            rule_data: HashMap::new(),
            repo_name: String::new(),
            component_image_tag: String::new(),
            component_env_var_prefix: String::new(),
            job_name: String::new(),
            job_type: String::new(),
            diff_files: ChangedFiles::default(),
            is_paired: "false".to_string(),
            required_binaries: Vec::new(),
            pr_remote_name: String::new(),
            pr_commit_sha: String::new(),
            pr_branch_name: String::new(),
            tekton_event_type: String::new(),
            requires_multi_platform_tests: false,
            requires_spray_proxy_registering: false,
            dry_run: false,
        }
    }

    /// Seeds the identification fields from CI configuration.
    pub fn from_config(config: &CiConfig) -> Self {
        let mut ctx = Self::new();
        ctx.repo_name = config.repo_name.clone();
        ctx.job_name = config.job_name.clone();
        ctx.job_type = config.job_type.clone();
        ctx.dry_run = config.dry_run;
        ctx.component_image_tag = config.component_image_tag.clone();
        ctx.component_env_var_prefix = config.component_env_var_prefix.clone();
        ctx.tekton_event_type = config.tekton_event_type.clone();

        if let Some(pull) = config.job_spec.as_ref().and_then(|spec| spec.primary_pull()) {
            ctx.pr_commit_sha = pull.sha.clone();
            ctx.pr_remote_name = pull.author.clone();
        }

        ctx
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn add_rule_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.rule_data.insert(key.into(), value.into());
    }

    pub fn rule_data(&self, key: &str) -> Option<&Value> {
        self.rule_data.get(key)
    }

    /// Reads `key` as a typed value. `None` when missing or of another shape.
    pub fn rule_data_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.rule_data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn label_filter(&self) -> &str {
        &self.runner.suite.label_filter
    }

    pub fn set_label_filter(&mut self, filter: impl Into<String>) {
        self.runner.suite.label_filter = filter.into();
    }

    pub fn paired(&self) -> bool {
        self.is_paired.trim().eq_ignore_ascii_case("true")
    }

    pub fn is_periodic(&self) -> bool {
        self.job_type == "periodic"
    }
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new()
    }
}
