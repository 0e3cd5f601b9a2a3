use std::fmt;

use crate::context::RuleContext;

/// Side effect executed when a rule matches.
///
/// Actions may mutate the context, run external processes or call remote
/// APIs. They should consult `ctx.dry_run` and only simulate when it is set.
pub trait Action: Send + Sync {
    fn execute(&self, ctx: &mut RuleContext) -> anyhow::Result<()>;
}

type ActionBody = dyn Fn(&mut RuleContext) -> anyhow::Result<()> + Send + Sync;

/// Leaf action wrapping a single function.
pub struct ActionFunc {
    name: String,
    body: Box<ActionBody>,
}

impl ActionFunc {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut RuleContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Action for ActionFunc {
    fn execute(&self, ctx: &mut RuleContext) -> anyhow::Result<()> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for ActionFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionFunc")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
