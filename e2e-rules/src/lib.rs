//! Rule engine for the e2e CI tooling.
//!
//! A CI entry point registers rule catalogs by category and catalog name,
//! builds a [`RuleContext`] describing the job, and asks the [`RuleEngine`]
//! to run some or all catalogs. Each [`Rule`] pairs a [`Conditional`] with
//! the [`Action`]s to execute when it matches; conditions compose with
//! [`All`], [`Any`] and [`NoneOf`], and rules themselves can be nested as
//! conditions to build chains.

mod action;
mod catalog;
mod condition;
mod context;
mod engine;
mod error;
mod files;
mod outcome;
mod rule;

pub use action::{Action, ActionFunc};
pub use catalog::RuleCatalog;
pub use condition::{All, Always, Any, ConditionFunc, Conditional, NoneOf};
pub use context::RuleContext;
pub use engine::{CatalogPath, RuleEngine};
pub use error::RuleError;
pub use files::{ChangedFile, ChangedFiles};
pub use outcome::{Completion, RunOutcome};
pub use rule::Rule;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_simple_rule() {
        let rule = Rule::new(
            "label",
            "select build-service specs",
            ConditionFunc::from_fn("is-build-service", |ctx| ctx.repo_name == "build-service"),
        )
        .with_action(ActionFunc::new("set-label", |ctx| {
            ctx.set_label_filter("build-service");
            Ok(())
        }));

        let engine = RuleEngine::new().with_catalog("repos", "build", RuleCatalog::new().with_rule(rule));
        let mut ctx = RuleContext::new();
        ctx.repo_name = "build-service".into();
        let outcome = engine.run_rules::<&str>(&mut ctx, &[]).expect("run");

        assert_eq!(outcome.matched, vec!["label".to_string()]);
        assert_eq!(outcome.completion, Completion::Applied);
        assert_eq!(ctx.label_filter(), "build-service");
    }
}
