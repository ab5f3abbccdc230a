//! Applying control rules across sets.
//!
//! Rules are evaluated on the source property and applied to the target's
//! `HIDDEN`/`INSENSITIVE` flags. Targets may live in any set.

use propconf_core::{ConfigError, PropertyContext, RuleOutcome};
use tracing::{debug, warn};

use crate::application::configuration::Configuration;

impl Configuration {
    /// Evaluates the rules of every property and applies the outcomes.
    ///
    /// Sources are visited in registration order, so when two rules target
    /// the same property the later one wins. Outcomes whose target does not
    /// exist are logged and skipped.
    pub fn evaluate_rules(&mut self) -> Vec<RuleOutcome> {
        let outcomes: Vec<RuleOutcome> = self
            .sets
            .iter()
            .flat_map(|s| s.properties().iter())
            .flat_map(PropertyContext::evaluate_rules)
            .collect();
        self.apply_outcomes(&outcomes);
        outcomes
    }

    /// Evaluates and applies the rules declared on `key` only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] when `key` is not registered.
    pub fn evaluate_rules_for(&mut self, key: &str) -> Result<Vec<RuleOutcome>, ConfigError> {
        let outcomes = self
            .property(key)
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?
            .evaluate_rules();
        self.apply_outcomes(&outcomes);
        Ok(outcomes)
    }

    fn apply_outcomes(&mut self, outcomes: &[RuleOutcome]) {
        for outcome in outcomes {
            match self.property_mut(&outcome.target) {
                Some(target) => {
                    target.apply_control(outcome.control);
                    debug!(
                        source = %outcome.source,
                        target = %outcome.target,
                        control = outcome.control.0,
                        "applied control rule"
                    );
                }
                None => warn!(
                    source = %outcome.source,
                    target = %outcome.target,
                    "control rule targets unknown property"
                ),
            }
        }
    }
}
