use std::fmt;

use tracing::debug;

use crate::action::Action;
use crate::condition::Conditional;
use crate::context::RuleContext;
use crate::error::RuleError;

/// Named unit pairing one condition with the actions it gates.
///
/// A rule without actions is a chain: only its condition's value matters,
/// and any side effects come from rules nested inside that condition.
pub struct Rule {
    /// Identifier used in logs and errors.
    pub name: String,
    pub description: String,
    pub condition: Box<dyn Conditional>,
    pub actions: Vec<Box<dyn Action>>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        condition: impl Conditional + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            condition: Box::new(condition),
            actions: Vec::new(),
        }
    }

    /// Appends an action; actions run in the order they were added.
    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Whether this rule has no actions of its own.
    pub fn is_chain(&self) -> bool {
        self.actions.is_empty()
    }

    /// Evaluates the condition without running any action of this rule.
    pub fn eval(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        self.condition.check(ctx)
    }

    /// Runs every action in order, stopping at the first failure.
    pub fn apply(&self, ctx: &mut RuleContext) -> Result<(), RuleError> {
        for action in &self.actions {
            action
                .execute(ctx)
                .map_err(|source| RuleError::action(&self.name, &self.description, source))?;
        }
        Ok(())
    }

    /// Runs the actions with `ctx.dry_run` switched on.
    pub fn dry_run(&self, ctx: &mut RuleContext) -> Result<(), RuleError> {
        ctx.dry_run = true;
        self.apply(ctx)
    }
}

/// Checking a rule applies it: when the condition holds its actions run (or
/// dry-run) before `true` is returned. This is what makes rule chains work.
impl Conditional for Rule {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        if !self.eval(ctx)? {
            return Ok(false);
        }

        debug!(rule = %self.name, "chained rule matched");
        if ctx.dry_run {
            self.dry_run(ctx)?;
        } else {
            self.apply(ctx)?;
        }
        Ok(true)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::action::ActionFunc;
    use crate::condition::{Always, ConditionFunc};

    fn recording(log: &Arc<Mutex<Vec<String>>>, label: &str) -> ActionFunc {
        let log = Arc::clone(log);
        let label = label.to_string();
        ActionFunc::new(label.clone(), move |ctx| {
            log.lock()
                .expect("log lock")
                .push(format!("{label}:{}", ctx.dry_run));
            Ok(())
        })
    }

    #[test]
    fn displays_name_and_description() {
        let rule = Rule::new("Bootstrap", "bootstrap the cluster", Always);
        assert_eq!(rule.to_string(), "Bootstrap: bootstrap the cluster");
        assert!(rule.is_chain());
    }

    #[test]
    fn dry_run_sets_flag_before_actions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = Rule::new("r", "d", Always)
            .with_action(recording(&log, "first"))
            .with_action(recording(&log, "second"));

        let mut ctx = RuleContext::new();
        rule.dry_run(&mut ctx).expect("dry run");

        assert!(ctx.dry_run);
        assert_eq!(*log.lock().unwrap(), vec!["first:true", "second:true"]);
    }

    #[test]
    fn checking_a_rule_applies_it_only_when_matched() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = Rule::new(
            "periodic",
            "only for periodic jobs",
            ConditionFunc::from_fn("periodic", |ctx| ctx.is_periodic()),
        )
        .with_action(recording(&log, "act"));

        let mut ctx = RuleContext::new();
        assert!(!rule.check(&mut ctx).unwrap());
        assert!(log.lock().unwrap().is_empty());

        ctx.job_type = "periodic".into();
        assert!(rule.check(&mut ctx).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["act:false"]);
    }

    #[test]
    fn action_error_carries_rule_identity() {
        let rule = Rule::new("Register", "register with the proxy", Always)
            .with_action(ActionFunc::new("fail", |_| anyhow::bail!("proxy unreachable")));

        let err = rule.apply(&mut RuleContext::new()).unwrap_err();
        assert!(err.to_string().contains("Register"));
        match err {
            RuleError::Action { source, .. } => assert_eq!(source.to_string(), "proxy unreachable"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
