use std::fmt;
use std::sync::Arc;

use crate::rule::Rule;

/// Ordered list of rules. Rules are evaluated and applied in this order.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog(Vec<Arc<Rule>>);

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; share one with a chain by pushing an `Arc` instead.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.0.push(Arc::new(rule));
        self
    }

    pub fn push(&mut self, rule: Arc<Rule>) {
        self.0.push(rule);
    }

    pub fn extend(&mut self, other: &RuleCatalog) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.0
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|rule| rule.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleCatalog {
    type Item = &'a Arc<Rule>;
    type IntoIter = std::slice::Iter<'a, Arc<Rule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rule names joined by commas.
impl fmt::Display for RuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}
