use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use e2e_core::config::load_ci_config;
use e2e_core::logging::init_tracing;
use e2e_rules::{CatalogPath, Completion, RuleContext};
use tracing::info;

mod catalogs;
mod git;

#[derive(Parser)]
#[command(name = "e2e-rules")]
#[command(about = "Select and run the e2e suites and setup actions for a CI job", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "E2E_LOG_LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories, or the catalogs of one category
    List {
        category: Option<String>,
    },
    /// Run the selected catalogs against the current job
    Run {
        category: Option<String>,
        catalog: Option<String>,
        /// Simulate the matched actions instead of executing them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Git revision to diff against when collecting changed files
        #[arg(long)]
        diff_base: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(Some(&cli.log_level))?;

    let engine = catalogs::engine();

    match cli.command {
        Commands::List { category } => match category {
            Some(category) => {
                for catalog in engine.list_catalogs(&category)? {
                    println!("{}/{}", category, catalog.bold());
                }
            }
            None => {
                for category in engine.list_categories() {
                    println!("{}", category.bold());
                }
            }
        },
        Commands::Run {
            category,
            catalog,
            dry_run,
            diff_base,
        } => {
            let config = load_ci_config().context("failed to load CI configuration")?;
            let mut ctx = RuleContext::from_config(&config);
            ctx.dry_run |= dry_run;
            ctx.required_binaries = catalogs::REQUIRED_BINARIES
                .iter()
                .map(|binary| binary.to_string())
                .collect();
            if let Some(base) = diff_base {
                ctx.diff_files = git::changed_files(&base)?;
                info!(files = %ctx.diff_files, "collected changed files");
            }

            let segments: Vec<String> = category.into_iter().chain(catalog).collect();
            let path = CatalogPath::from_segments(&segments)?;
            let outcome = engine.run_path(&mut ctx, &path)?;

            let summary = match &outcome.completion {
                Completion::NothingMatched => "no rule matched".to_string(),
                Completion::ChainSatisfied { rule } => format!("rule chain {rule} applied"),
                Completion::Applied => format!("applied {}", outcome.matched.join(",")),
                Completion::DryRun { rule } => format!("dry run of {rule}"),
            };
            info!(path = %path, loaded = outcome.loaded, "{summary}");
            println!("{} {}", "✔".green(), summary);
        }
    }

    Ok(())
}
