//! Rule registry.

use super::rule::{Category, Rule, RuleMetadata};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Registry of rules keyed by id.
///
/// Filled once at start-up and read concurrently afterwards. Registering an
/// id twice is an error.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, Arc<dyn Rule>>,
}

static GLOBAL: OnceLock<RuleRegistry> = OnceLock::new();

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in rule.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for rule in crate::rules::builtin_rules() {
            if let Err(e) = registry.register(rule) {
                log::error!("Failed to register built-in rule: {}", e);
            }
        }
        registry
    }

    /// The process-wide registry of built-in rules, built on first use.
    pub fn global() -> &'static RuleRegistry {
        GLOBAL.get_or_init(Self::with_builtin)
    }

    /// Register a rule.
    ///
    /// Fails with [`Error::Config`] when the id is empty or taken.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        let id = rule.id().trim().to_string();
        if id.is_empty() {
            return Err(Error::Config(format!(
                "rule '{}' must have an id",
                rule.name()
            )));
        }
        if self.rules.contains_key(&id) {
            return Err(Error::Config(format!("rule '{}' is already registered", id)));
        }
        log::debug!("Registered rule {} (priority {})", id, rule.priority());
        self.rules.insert(id, rule);
        Ok(())
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(id).cloned()
    }

    /// Whether a rule id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// All rules, by id.
    pub fn all(&self) -> Vec<Arc<dyn Rule>> {
        self.rules.values().cloned().collect()
    }

    /// All rules in execution order: `(priority, id)` ascending.
    pub fn ordered(&self) -> Vec<Arc<dyn Rule>> {
        let mut rules = self.all();
        rules.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.id().cmp(b.id()))
        });
        rules
    }

    /// Rules in one category, by id.
    ///
    /// Unknown category names match nothing.
    pub fn by_category(&self, name: &str) -> Vec<Arc<dyn Rule>> {
        match name.parse::<Category>() {
            Ok(category) => self
                .rules
                .values()
                .filter(|r| r.category() == category)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Metadata of every rule in execution order.
    pub fn metadata(&self) -> Vec<RuleMetadata> {
        self.ordered().iter().map(|r| r.metadata()).collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.ids())
            .finish()
    }
}
