use thiserror::Error;

/// Errors returned by the rules engine when resolving or running catalogs.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("{0} is not a category registered in the engine")]
    CategoryNotRegistered(String),
    #[error("{catalog} is not a catalog registered in the engine")]
    CatalogNotRegistered { category: String, catalog: String },
    #[error("invalid catalog path {0:?}: expected at most a category and a catalog")]
    InvalidPath(String),
    #[error("failed to execute rule {rule}: {description}")]
    Action {
        rule: String,
        description: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to apply RuleChain: {rule}")]
    ChainNotApplied { rule: String },
}

impl RuleError {
    pub fn action(
        rule: impl Into<String>,
        description: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        RuleError::Action {
            rule: rule.into(),
            description: description.into(),
            source,
        }
    }

    /// Whether the error was raised while resolving the catalog path.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RuleError::CategoryNotRegistered(_)
                | RuleError::CatalogNotRegistered { .. }
                | RuleError::InvalidPath(_)
        )
    }
}
