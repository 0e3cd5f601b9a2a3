use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, error, info};

use crate::catalog::RuleCatalog;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::outcome::{Completion, RunOutcome};

/// Selection of catalogs to run, addressed as `category/catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogPath {
    /// Every catalog of every category.
    #[default]
    All,
    /// Every catalog of one category.
    Category(String),
    /// Exactly one catalog.
    Catalog { category: String, catalog: String },
}

impl CatalogPath {
    /// Builds a path from zero, one or two segments.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, RuleError> {
        match segments {
            [] => Ok(CatalogPath::All),
            [category] => Ok(CatalogPath::Category(category.as_ref().to_string())),
            [category, catalog] => Ok(CatalogPath::Catalog {
                category: category.as_ref().to_string(),
                catalog: catalog.as_ref().to_string(),
            }),
            _ => {
                let joined: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
                Err(RuleError::InvalidPath(joined.join("/")))
            }
        }
    }
}

impl FromStr for CatalogPath {
    type Err = RuleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        CatalogPath::from_segments(segments.as_slice())
    }
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogPath::All => f.write_str("*"),
            CatalogPath::Category(category) => f.write_str(category),
            CatalogPath::Catalog { category, catalog } => write!(f, "{category}/{catalog}"),
        }
    }
}

/// Registry of rule catalogs keyed by category, then catalog name.
///
/// Both levels keep registration order, so flattening several catalogs
/// always yields the same rule order.
#[derive(Debug, Default, Clone)]
pub struct RuleEngine {
    categories: IndexMap<String, IndexMap<String, RuleCatalog>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `catalog` under `category/name`, replacing an existing entry.
    pub fn register(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        catalog: RuleCatalog,
    ) -> &mut Self {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(name.into(), catalog);
        self
    }

    pub fn with_catalog(
        mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        catalog: RuleCatalog,
    ) -> Self {
        self.register(category, name, catalog);
        self
    }

    /// Category names in registration order.
    pub fn list_categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Catalog names registered under `category`.
    pub fn list_catalogs(&self, category: &str) -> Result<Vec<&str>, RuleError> {
        let catalogs = self
            .categories
            .get(category)
            .ok_or_else(|| RuleError::CategoryNotRegistered(category.to_string()))?;
        Ok(catalogs.keys().map(String::as_str).collect())
    }

    /// Flattens the catalogs selected by `path` into one ordered list.
    pub fn resolve(&self, path: &CatalogPath) -> Result<RuleCatalog, RuleError> {
        let mut loaded = RuleCatalog::new();
        match path {
            CatalogPath::All => {
                for catalog in self.categories.values().flat_map(IndexMap::values) {
                    loaded.extend(catalog);
                }
            }
            CatalogPath::Category(category) => {
                let catalogs = self
                    .categories
                    .get(category)
                    .ok_or_else(|| RuleError::CategoryNotRegistered(category.clone()))?;
                info!(category = %category, "loading the catalogs for category");
                for catalog in catalogs.values() {
                    loaded.extend(catalog);
                }
            }
            CatalogPath::Catalog { category, catalog } => {
                let catalogs = self
                    .categories
                    .get(category)
                    .ok_or_else(|| RuleError::CategoryNotRegistered(category.clone()))?;
                let selected =
                    catalogs
                        .get(catalog)
                        .ok_or_else(|| RuleError::CatalogNotRegistered {
                            category: category.clone(),
                            catalog: catalog.clone(),
                        })?;
                info!(category = %category, catalog = %catalog, "loading the catalog");
                loaded.extend(selected);
            }
        }
        Ok(loaded)
    }

    /// Runs the catalogs addressed by zero, one or two path segments.
    pub fn run_rules<S: AsRef<str>>(
        &self,
        ctx: &mut RuleContext,
        segments: &[S],
    ) -> Result<RunOutcome, RuleError> {
        let path = CatalogPath::from_segments(segments)?;
        self.run_path(ctx, &path)
    }

    /// Runs every catalog registered under `category`.
    pub fn run_rules_of_category(
        &self,
        category: &str,
        ctx: &mut RuleContext,
    ) -> Result<RunOutcome, RuleError> {
        self.run_path(ctx, &CatalogPath::Category(category.to_string()))
    }

    pub fn run_path(
        &self,
        ctx: &mut RuleContext,
        path: &CatalogPath,
    ) -> Result<RunOutcome, RuleError> {
        let loaded = self.resolve(path)?;
        self.run_loaded_catalog(&loaded, ctx)
    }

    /// Evaluates every rule of `loaded`, then applies the matched ones.
    ///
    /// A zero-action rule ends the run as soon as it is reached: success when
    /// its condition holds, [`RuleError::ChainNotApplied`] otherwise. Rules
    /// after it are never evaluated and earlier matches are never applied.
    pub fn run_loaded_catalog(
        &self,
        loaded: &RuleCatalog,
        ctx: &mut RuleContext,
    ) -> Result<RunOutcome, RuleError> {
        let mut outcome = RunOutcome::new(loaded.len());
        let mut matched = RuleCatalog::new();

        for rule in loaded {
            let ok = rule.eval(ctx)?;
            if rule.is_chain() {
                if ok {
                    debug!(rule = %rule.name, "rule chain applied");
                    outcome.completion = Completion::ChainSatisfied {
                        rule: rule.name.clone(),
                    };
                    return Ok(outcome);
                }
                return Err(RuleError::ChainNotApplied {
                    rule: rule.name.clone(),
                });
            }
            if ok {
                outcome.record_match(rule.name.clone());
                matched.push(rule.clone());
            }
        }

        if matched.is_empty() {
            return Ok(outcome);
        }

        info!(rules = %matched, "the following rules have matched");
        if ctx.dry_run {
            self.dry_run(&matched, ctx, &mut outcome)?;
        } else {
            self.run(&matched, ctx)?;
            outcome.completion = Completion::Applied;
        }
        Ok(outcome)
    }

    /// Simulates the first matched rule only.
    fn dry_run(
        &self,
        matched: &RuleCatalog,
        ctx: &mut RuleContext,
        outcome: &mut RunOutcome,
    ) -> Result<(), RuleError> {
        info!("dry run has been enabled, applying matched rules in dry run mode");
        if let Some(rule) = matched.rules().first() {
            outcome.completion = Completion::DryRun {
                rule: rule.name.clone(),
            };
            rule.dry_run(ctx)?;
        }
        Ok(())
    }

    fn run(&self, matched: &RuleCatalog, ctx: &mut RuleContext) -> Result<(), RuleError> {
        info!("applying matched rules");
        for rule in matched {
            if let Err(err) = rule.apply(ctx) {
                error!(rule = %rule, error = %err, "failed to execute rule");
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Always;
    use crate::rule::Rule;

    fn engine() -> RuleEngine {
        let noop = || Rule::new("noop", "does nothing", Always);
        RuleEngine::new()
            .with_catalog("repos", "build-service", RuleCatalog::new().with_rule(noop()))
            .with_catalog("repos", "e2e-tests", RuleCatalog::new().with_rule(noop()))
            .with_catalog("demo", "local", RuleCatalog::new())
    }

    #[test]
    fn lists_in_registration_order() {
        let engine = engine();
        assert_eq!(engine.list_categories(), vec!["repos", "demo"]);
        assert_eq!(
            engine.list_catalogs("repos").unwrap(),
            vec!["build-service", "e2e-tests"]
        );
        assert!(matches!(
            engine.list_catalogs("missing"),
            Err(RuleError::CategoryNotRegistered(_))
        ));
    }

    #[test]
    fn parses_catalog_paths() {
        assert_eq!("".parse::<CatalogPath>().unwrap(), CatalogPath::All);
        assert_eq!(
            "repos".parse::<CatalogPath>().unwrap(),
            CatalogPath::Category("repos".into())
        );
        let path: CatalogPath = "repos/e2e-tests".parse().unwrap();
        assert_eq!(path.to_string(), "repos/e2e-tests");
        assert!(matches!(
            "a/b/c".parse::<CatalogPath>(),
            Err(RuleError::InvalidPath(_))
        ));
    }

    #[test]
    fn resolves_by_depth() {
        let engine = engine();
        assert_eq!(engine.resolve(&CatalogPath::All).unwrap().len(), 2);
        assert_eq!(
            engine
                .resolve(&CatalogPath::Category("repos".into()))
                .unwrap()
                .len(),
            2
        );
        let single = CatalogPath::from_segments(&["repos", "e2e-tests"]).unwrap();
        assert_eq!(engine.resolve(&single).unwrap().len(), 1);
    }

    #[test]
    fn registering_twice_replaces_catalog() {
        let mut engine = engine();
        engine.register("repos", "build-service", RuleCatalog::new());
        let path = CatalogPath::from_segments(&["repos", "build-service"]).unwrap();
        assert!(engine.resolve(&path).unwrap().is_empty());
        assert_eq!(
            engine.list_catalogs("repos").unwrap(),
            vec!["build-service", "e2e-tests"]
        );
    }
}
