//! Catalogs registered by the `e2e-rules` binary.
//!
//! The `demo` category mirrors a local run: preflight checks gate the cluster
//! bootstrap, then the changed files decide which suites run. The `repos`
//! category holds per-repository default settings.

use std::env;
use std::process::Command;
use std::sync::Arc;

use anyhow::bail;
use e2e_rules::{
    ActionFunc, All, Any, ConditionFunc, NoneOf, Rule, RuleCatalog, RuleContext, RuleEngine,
};
use tracing::info;

/// Secrets that must be present before a cluster can be bootstrapped.
pub const REQUIRED_ENV: [&str; 4] = [
    "GITHUB_TOKEN",
    "QUAY_TOKEN",
    "DEFAULT_QUAY_ORG",
    "DEFAULT_QUAY_ORG_TOKEN",
];

/// Tools expected on `PATH` for a local run.
pub const REQUIRED_BINARIES: [&str; 6] = ["jq", "kubectl", "oc", "yq", "git", "helm"];

/// Builds the engine with every catalog this binary knows about.
pub fn engine() -> RuleEngine {
    RuleEngine::new()
        .with_catalog("demo", "local-e2e", local_e2e_catalog())
        .with_catalog(
            "repos",
            "build-service",
            RuleCatalog::new().with_rule(build_service_default_settings()),
        )
}

fn local_e2e_catalog() -> RuleCatalog {
    let preflight = Arc::new(
        Rule::new(
            "Bootstrap a Cluster",
            "Bootstrap the cluster when the environment has all the required variables and tools",
            ConditionFunc::new("preflight-checks", preflight_checked),
        )
        .with_action(ActionFunc::new("install-test-runner", install_test_runner))
        .with_action(ActionFunc::new("bootstrap-cluster", bootstrap_cluster)),
    );

    let chain = Rule::new(
        "Local Install and Test Run of e2e-repo",
        "Install Konflux to a cluster and run tests based on file changes when executed from a local system",
        All::default()
            .with(preflight)
            .with(Any::default().with(non_test_files_rule()).with(test_files_only_rule())),
    );

    RuleCatalog::new().with_rule(chain)
}

fn non_test_files_changed() -> Any {
    Any::default()
        .with(changed_under("pkg-files", "pkg/"))
        .with(changed_under("mage-files", "magefiles/"))
        .with(changed_under("cmd-files", "cmd/"))
        .with(ConditionFunc::from_fn("no-files", |ctx| ctx.diff_files.is_empty()))
}

fn changed_under(name: &'static str, dir: &'static str) -> ConditionFunc {
    ConditionFunc::from_fn(name, move |ctx| !ctx.diff_files.filter_by_dir_string(dir).is_empty())
}

fn non_test_files_rule() -> Rule {
    Rule::new(
        "E2E Default PR Test Execution",
        "Runs all suites when any non test files are modified",
        non_test_files_changed(),
    )
    .with_action(ActionFunc::new("execute-tests", execute_tests))
}

fn test_files_only_rule() -> Rule {
    Rule::new(
        "E2E PR Test File Diff Execution",
        "Runs the suites whose test files are the only changes",
        All::default()
            .with(NoneOf::default().with(non_test_files_changed()))
            .with(ConditionFunc::from_fn("test-files", |ctx| {
                !ctx.diff_files.filter_by_dir_glob("tests/**/*.go").is_empty()
            })),
    )
    .with_action(ActionFunc::new("focus-changed-suites", focus_changed_suites))
    .with_action(ActionFunc::new("execute-tests", execute_tests))
}

fn build_service_default_settings() -> Rule {
    Rule::new(
        "BuildServiceRepoSetDefaultSettingsRule",
        "Require SprayProxy registering and select build-service specs for build-service jobs",
        ConditionFunc::from_fn("is-build-service", |ctx| ctx.repo_name == "build-service"),
    )
    .with_action(ActionFunc::new("set-defaults", |ctx| {
        ctx.requires_spray_proxy_registering = true;
        ctx.set_label_filter("build-service");
        info!("SprayProxy registering required, label filter set to build-service");
        Ok(())
    }))
}

fn preflight_checked(ctx: &RuleContext) -> anyhow::Result<bool> {
    if ctx.dry_run {
        info!("all environment variables have been set");
        info!("all tools and commands have been found");
        return Ok(true);
    }

    let missing: Vec<&str> = REQUIRED_ENV
        .iter()
        .copied()
        .filter(|key| env::var(key).map(|value| value.is_empty()).unwrap_or(true))
        .collect();
    if !missing.is_empty() {
        bail!(
            "required env vars containing secrets ({}) not defined or empty",
            missing.join(",")
        );
    }

    for binary in &ctx.required_binaries {
        if which::which(binary).is_err() {
            bail!("binary {binary} not found in PATH - please install it first");
        }
    }

    Ok(true)
}

fn install_test_runner(ctx: &mut RuleContext) -> anyhow::Result<()> {
    info!(dry_run = ctx.dry_run, "installing the ginkgo test runner");
    info!("running command: go install -mod=mod github.com/onsi/ginkgo/v2/ginkgo");
    Ok(())
}

fn bootstrap_cluster(ctx: &mut RuleContext) -> anyhow::Result<()> {
    info!(dry_run = ctx.dry_run, "installing Konflux in preview mode");
    Ok(())
}

/// Restricts the run to the suites whose test directories changed.
fn focus_changed_suites(ctx: &mut RuleContext) -> anyhow::Result<()> {
    let mut suites: Vec<String> = Vec::new();
    for file in ctx.diff_files.filter_by_dir_glob("tests/**/*.go").iter() {
        if let Some(suite) = file.name.split('/').nth(1) {
            if !suites.iter().any(|existing| existing == suite) {
                suites.push(suite.to_string());
            }
        }
    }
    ctx.set_label_filter(suites.join("||"));
    info!(label_filter = %ctx.label_filter(), "focusing changed suites");
    Ok(())
}

fn execute_tests(ctx: &mut RuleContext) -> anyhow::Result<()> {
    if ctx.dry_run {
        ctx.runner.cli.parallel = false;
    } else {
        ctx.runner.cli.procs = 20;
    }

    let mut args = ctx.runner.to_args();
    args.extend(["./cmd".to_string(), "--".to_string()]);

    if ctx.dry_run {
        info!("running command: ginkgo {}", args.join(" "));
        return Ok(());
    }

    let status = Command::new("ginkgo").args(&args).status()?;
    if !status.success() {
        bail!("ginkgo exited with {status}");
    }
    Ok(())
}
