use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default suite timeout used by every CI job.
pub const DEFAULT_SUITE_TIMEOUT: Duration = Duration::from_secs(90 * 60);

/// Default output interception mode of the test runner.
pub const DEFAULT_OUTPUT_INTERCEPTOR_MODE: &str = "none";

/// Settings handed to the external test runner.
///
/// Rule actions own and mutate this block; the rule engine never reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestRunnerConfig {
    pub suite: SuiteConfig,
    pub reporter: ReporterConfig,
    pub cli: CliConfig,
    pub go_flags: GoFlagsConfig,
}

/// Spec selection and suite level behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteConfig {
    pub label_filter: String,
    pub focus_strings: Vec<String>,
    pub skip_strings: Vec<String>,
    pub fail_fast: bool,
    pub flake_attempts: u32,
    pub timeout: Duration,
    pub output_interceptor_mode: String,
    pub randomize_all_specs: bool,
    pub dry_run: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            label_filter: String::new(),
            focus_strings: Vec::new(),
            skip_strings: Vec::new(),
            fail_fast: false,
            flake_attempts: 0,
            timeout: DEFAULT_SUITE_TIMEOUT,
            output_interceptor_mode: DEFAULT_OUTPUT_INTERCEPTOR_MODE.to_string(),
            randomize_all_specs: false,
            dry_run: false,
        }
    }
}

/// Report formats and verbosity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReporterConfig {
    pub no_color: bool,
    pub verbose: bool,
    pub very_verbose: bool,
    pub succinct: bool,
    pub junit_report: String,
    pub json_report: String,
}

/// Process level runner settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    pub procs: u32,
    pub parallel: bool,
    pub keep_going: bool,
    pub repeat: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            procs: 1,
            parallel: false,
            keep_going: false,
            repeat: 0,
        }
    }
}

/// Flags forwarded to the go toolchain when compiling suites.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoFlagsConfig {
    pub race: bool,
    pub cover: bool,
    pub tags: String,
}

impl TestRunnerConfig {
    /// Renders the configured settings as command line flags for the test runner.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.cli.parallel {
            args.push("-p".to_string());
        }
        if self.cli.procs > 1 {
            args.push(format!("--procs={}", self.cli.procs));
        }
        push_flag(&mut args, "keep-going", self.cli.keep_going);
        if self.cli.repeat > 0 {
            args.push(format!("--repeat={}", self.cli.repeat));
        }

        push_value(&mut args, "label-filter", &self.suite.label_filter);
        for focus in &self.suite.focus_strings {
            push_value(&mut args, "focus", focus);
        }
        for skip in &self.suite.skip_strings {
            push_value(&mut args, "skip", skip);
        }
        push_flag(&mut args, "fail-fast", self.suite.fail_fast);
        if self.suite.flake_attempts > 0 {
            args.push(format!("--flake-attempts={}", self.suite.flake_attempts));
        }
        args.push(format!("--timeout={}", format_duration(self.suite.timeout)));
        push_value(
            &mut args,
            "output-interceptor-mode",
            &self.suite.output_interceptor_mode,
        );
        push_flag(&mut args, "randomize-all", self.suite.randomize_all_specs);
        push_flag(&mut args, "dry-run", self.suite.dry_run);

        push_flag(&mut args, "no-color", self.reporter.no_color);
        push_flag(&mut args, "v", self.reporter.verbose);
        push_flag(&mut args, "vv", self.reporter.very_verbose);
        push_flag(&mut args, "succinct", self.reporter.succinct);
        push_value(&mut args, "junit-report", &self.reporter.junit_report);
        push_value(&mut args, "json-report", &self.reporter.json_report);

        push_flag(&mut args, "race", self.go_flags.race);
        push_flag(&mut args, "cover", self.go_flags.cover);
        push_value(&mut args, "tags", &self.go_flags.tags);

        args
    }
}

fn push_flag(args: &mut Vec<String>, name: &str, enabled: bool) {
    if enabled {
        args.push(format!("--{name}"));
    }
}

fn push_value(args: &mut Vec<String>, name: &str, value: &str) {
    if !value.is_empty() {
        args.push(format!("--{name}={value}"));
    }
}

/// Formats a duration the way the runner parses it (`90m`, `2h`, `45s`).
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ci_expectations() {
        let config = TestRunnerConfig::default();
        assert_eq!(config.suite.timeout, Duration::from_secs(5400));
        assert_eq!(config.suite.output_interceptor_mode, "none");
        assert_eq!(config.suite.label_filter, "");
        assert_eq!(config.cli.procs, 1);
        assert!(!config.cli.parallel);
    }

    #[test]
    fn default_args_only_carry_timeout_and_interceptor() {
        let args = TestRunnerConfig::default().to_args();
        assert_eq!(
            args,
            vec![
                "--timeout=90m".to_string(),
                "--output-interceptor-mode=none".to_string()
            ]
        );
    }

    #[test]
    fn renders_selection_and_parallelism() {
        let mut config = TestRunnerConfig::default();
        config.cli.parallel = true;
        config.cli.procs = 20;
        config.suite.label_filter = "build-service".into();
        config.suite.focus_strings = vec!["pipelines".into()];
        config.suite.timeout = Duration::from_secs(7200);
        config.reporter.junit_report = "e2e-report.xml".into();

        let args = config.to_args();
        assert_eq!(&args[..2], &["-p".to_string(), "--procs=20".to_string()]);
        assert!(args.contains(&"--label-filter=build-service".to_string()));
        assert!(args.contains(&"--focus=pipelines".to_string()));
        assert!(args.contains(&"--timeout=2h".to_string()));
        assert!(args.contains(&"--junit-report=e2e-report.xml".to_string()));
    }

    #[test]
    fn formats_odd_durations_in_seconds() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
    }
}
