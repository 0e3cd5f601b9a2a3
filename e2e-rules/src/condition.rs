use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::context::RuleContext;
use crate::error::RuleError;

/// Boolean predicate evaluated against a [`RuleContext`].
///
/// Errors returned from `check` abort the run. Leaf predicate failures never
/// do: [`ConditionFunc`] logs them and evaluates to `false`. Only actions run
/// by a chained [`Rule`](crate::Rule) surface as errors here.
pub trait Conditional: Send + Sync {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError>;

    /// Boxes the condition so it can sit inside a composite.
    fn boxed(self) -> Box<dyn Conditional>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<C: Conditional + ?Sized> Conditional for Arc<C> {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        (**self).check(ctx)
    }
}

impl<C: Conditional + ?Sized> Conditional for Box<C> {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        (**self).check(ctx)
    }
}

type Predicate = dyn Fn(&RuleContext) -> anyhow::Result<bool> + Send + Sync;

/// Leaf condition wrapping a single predicate function.
pub struct ConditionFunc {
    name: String,
    predicate: Box<Predicate>,
}

impl ConditionFunc {
    /// Wraps a fallible predicate. A failure is logged and counts as `false`.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RuleContext) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Wraps an infallible predicate.
    pub fn from_fn<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RuleContext) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |ctx| Ok(predicate(ctx)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Conditional for ConditionFunc {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        match (self.predicate)(ctx) {
            Ok(matched) => Ok(matched),
            Err(err) => {
                warn!(condition = %self.name, error = %err, "condition failed, treating as false");
                Ok(false)
            }
        }
    }
}

impl fmt::Debug for ConditionFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionFunc")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// True when every member is true. Stops at the first false member.
#[derive(Default)]
pub struct All(pub Vec<Box<dyn Conditional>>);

/// True when at least one member is true. Stops at the first true member.
#[derive(Default)]
pub struct Any(pub Vec<Box<dyn Conditional>>);

/// True when no member is true. Stops at the first true member.
#[derive(Default)]
pub struct NoneOf(pub Vec<Box<dyn Conditional>>);

macro_rules! composite {
    ($name:ident) => {
        impl $name {
            pub fn new(conditions: Vec<Box<dyn Conditional>>) -> Self {
                Self(conditions)
            }

            /// Appends a member, keeping declaration order.
            pub fn with(mut self, condition: impl Conditional + 'static) -> Self {
                self.0.push(Box::new(condition));
                self
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("members", &self.0.len())
                    .finish()
            }
        }
    };
}

composite!(All);
composite!(Any);
composite!(NoneOf);

impl Conditional for All {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        for condition in &self.0 {
            if !condition.check(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Conditional for Any {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        for condition in &self.0 {
            if condition.check(ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Conditional for NoneOf {
    fn check(&self, ctx: &mut RuleContext) -> Result<bool, RuleError> {
        for condition in &self.0 {
            if condition.check(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Condition that is always true, for unconditional rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl Conditional for Always {
    fn check(&self, _ctx: &mut RuleContext) -> Result<bool, RuleError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_predicate_evaluates_false() {
        let condition = ConditionFunc::new("needs-token", |_| anyhow::bail!("token missing"));
        let mut ctx = RuleContext::new();
        assert!(!condition.check(&mut ctx).expect("errors are swallowed"));
    }

    #[test]
    fn empty_composites_follow_boolean_identities() {
        let mut ctx = RuleContext::new();
        assert!(All::default().check(&mut ctx).unwrap());
        assert!(!Any::default().check(&mut ctx).unwrap());
        assert!(NoneOf::default().check(&mut ctx).unwrap());
    }

    #[test]
    fn composites_nest() {
        let periodic = ConditionFunc::from_fn("periodic", |ctx| ctx.job_type == "periodic");
        let rehearse = ConditionFunc::from_fn("rehearse", |ctx| ctx.job_name.contains("rehearse"));
        let is_e2e = ConditionFunc::from_fn("e2e", |ctx| ctx.repo_name == "e2e-tests");
        let gate = All::default()
            .with(is_e2e)
            .with(NoneOf::default().with(periodic).with(rehearse));

        let mut ctx = RuleContext::new();
        ctx.repo_name = "e2e-tests".into();
        assert!(gate.check(&mut ctx).unwrap());

        ctx.job_name = "rehearse-1234".into();
        assert!(!gate.check(&mut ctx).unwrap());
    }
}
