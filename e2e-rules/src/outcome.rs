/// How a successful catalog run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No action-bearing rule matched; nothing was applied.
    NothingMatched,
    /// A zero-action rule evaluated true and ended the run early.
    ChainSatisfied { rule: String },
    /// Every matched rule was applied.
    Applied,
    /// Dry-run mode: only the first matched rule was simulated.
    DryRun { rule: String },
}

/// Summary of a successful engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Number of rules in the flattened catalog list.
    pub loaded: usize,
    /// Names of the action-bearing rules whose condition matched, in order.
    pub matched: Vec<String>,
    pub completion: Completion,
}

impl RunOutcome {
    pub fn new(loaded: usize) -> Self {
        Self {
            loaded,
            matched: Vec::new(),
            completion: Completion::NothingMatched,
        }
    }

    pub fn record_match(&mut self, rule: impl Into<String>) {
        self.matched.push(rule.into());
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.completion, Completion::DryRun { .. })
    }
}
