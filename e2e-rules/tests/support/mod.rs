// Shared spies for the engine integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use e2e_rules::{ActionFunc, ConditionFunc, RuleContext};

/// Condition returning a fixed value while counting its invocations.
pub struct Spy {
    calls: Arc<AtomicUsize>,
}

impl Spy {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn condition(&self, name: &str, value: bool) -> ConditionFunc {
        let calls = Arc::clone(&self.calls);
        ConditionFunc::from_fn(name, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            value
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn was_called(&self) -> bool {
        self.calls() > 0
    }
}

/// Ordered journal of action executions: `(action, dry_run seen)`.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(String, bool)>>>,
}

impl Journal {
    pub fn action(&self, name: &str) -> ActionFunc {
        let entries = Arc::clone(&self.entries);
        let label = name.to_string();
        ActionFunc::new(name, move |ctx: &mut RuleContext| {
            entries
                .lock()
                .expect("journal lock")
                .push((label.clone(), ctx.dry_run));
            Ok(())
        })
    }

    pub fn failing(&self, name: &str, message: &'static str) -> ActionFunc {
        let entries = Arc::clone(&self.entries);
        let label = name.to_string();
        ActionFunc::new(name, move |ctx: &mut RuleContext| {
            entries
                .lock()
                .expect("journal lock")
                .push((label.clone(), ctx.dry_run));
            Err(anyhow::anyhow!(message))
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("journal lock")
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn dry_run_flags(&self) -> Vec<bool> {
        self.entries
            .lock()
            .expect("journal lock")
            .iter()
            .map(|(_, dry_run)| *dry_run)
            .collect()
    }
}
