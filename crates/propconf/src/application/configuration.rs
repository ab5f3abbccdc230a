//! The top-level configuration: registered sets and the page index.
//!
//! A [`Configuration`] owns every [`ConfigSet`] in registration order. Each
//! set may declare the pages it owns; the first set to declare a page wins
//! it. Sets without declared pages act as the fallback for pages nobody
//! declared.
//!
//! Load/save ([`super::load_save`]), lifecycle ([`super::lifecycle`]) and
//! rule evaluation ([`super::rules`]) are implemented as further `impl`
//! blocks in their own modules.

use std::collections::HashMap;

use propconf_core::{
    ConfigError, ConfigSet, PageLayout, PropertyContext, Value,
};
use tracing::{debug, info};

/// Ordered collection of configuration sets.
#[derive(Debug, Default)]
pub struct Configuration {
    pub(crate) sets: Vec<ConfigSet>,
    page_index: HashMap<String, usize>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] when the set name, or any of
    /// its property keys, is already registered.
    pub fn add_set(&mut self, set: ConfigSet) -> Result<(), ConfigError> {
        if self.set(set.name()).is_some() {
            return Err(ConfigError::AlreadyExists(set.name().to_string()));
        }
        if let Some(key) = set.properties().keys().find(|k| self.property(k).is_some()) {
            return Err(ConfigError::AlreadyExists(key.to_string()));
        }

        info!(
            set = %set.name(),
            backend = %set.backend().name(),
            properties = set.properties().len(),
            "registered configuration set"
        );
        self.sets.push(set);
        self.rebuild_page_index();
        Ok(())
    }

    /// Adds a property to the named set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] when the key is registered in
    /// any set, and [`ConfigError::InvalidKey`] when no set is called
    /// `set_name`.
    pub fn add_property(&mut self, set_name: &str, ctx: PropertyContext) -> Result<(), ConfigError> {
        if self.property(ctx.key()).is_some() {
            return Err(ConfigError::AlreadyExists(ctx.key().to_string()));
        }
        let set = self
            .set_mut(set_name)
            .ok_or_else(|| ConfigError::InvalidKey(set_name.to_string()))?;
        set.add_property(ctx)
    }

    pub fn sets(&self) -> &[ConfigSet] {
        &self.sets
    }

    pub fn set(&self, name: &str) -> Option<&ConfigSet> {
        self.sets.iter().find(|s| s.name() == name)
    }

    pub fn set_mut(&mut self, name: &str) -> Option<&mut ConfigSet> {
        self.sets.iter_mut().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub(crate) fn ensure_sets(&self) -> Result<(), ConfigError> {
        if self.sets.is_empty() {
            Err(ConfigError::NoConfigSetRegistered)
        } else {
            Ok(())
        }
    }

    fn rebuild_page_index(&mut self) {
        self.page_index.clear();
        for (i, set) in self.sets.iter().enumerate() {
            for page in set.pages() {
                self.page_index.entry(page.clone()).or_insert(i);
            }
        }
        debug!(pages = self.page_index.len(), "rebuilt page index");
    }

    /// Index of the set that owns `page`.
    ///
    /// With no declared pages anywhere, the first set owns every page.
    /// Otherwise the declaring set wins, then the first set without
    /// declared pages.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`] with zero sets, and
    /// [`ConfigError::InvalidPage`] when no set can take the page.
    pub fn resolve_page(&self, page: &str) -> Result<usize, ConfigError> {
        self.ensure_sets()?;
        if self.page_index.is_empty() {
            return Ok(0);
        }
        if let Some(&i) = self.page_index.get(page) {
            return Ok(i);
        }
        self.sets
            .iter()
            .position(|s| s.pages().is_empty())
            .ok_or_else(|| ConfigError::InvalidPage(page.to_string()))
    }

    /// The set that owns `page`.
    ///
    /// # Errors
    ///
    /// See [`resolve_page`](Self::resolve_page).
    pub fn set_for_page(&self, page: &str) -> Result<&ConfigSet, ConfigError> {
        let i = self.resolve_page(page)?;
        Ok(&self.sets[i])
    }

    pub fn property(&self, key: &str) -> Option<&PropertyContext> {
        self.sets.iter().find_map(|s| s.properties().get(key))
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut PropertyContext> {
        self.sets
            .iter_mut()
            .find_map(|s| s.properties_mut().get_mut(key))
    }

    /// Convenience accessor for a property's current value.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.property(key).map(PropertyContext::value)
    }

    /// Sets a property from the UI: the value is validated, marked unsaved
    /// when it changed, and the property's rules are re-evaluated.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidKey`] for unknown keys, otherwise whatever
    /// [`PropertyContext::edit_value`] rejects.
    pub fn edit_value(&mut self, key: &str, value: &Value) -> Result<(), ConfigError> {
        let ctx = self
            .property_mut(key)
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        ctx.edit_value(value)?;
        self.evaluate_rules_for(key)?;
        Ok(())
    }

    /// Keys whose values were edited but not yet saved.
    pub fn unsaved_keys(&self) -> Vec<&str> {
        self.sets
            .iter()
            .flat_map(|s| s.properties().iter())
            .filter(|ctx| ctx.is_unsaved())
            .map(PropertyContext::key)
            .collect()
    }

    /// Page → group → key tree over every registered property.
    pub fn layout(&self) -> PageLayout {
        PageLayout::from_specs(
            self.sets
                .iter()
                .flat_map(|s| s.properties().iter())
                .map(PropertyContext::spec),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{ctx, FakeBackend};
    use propconf_core::{PropertySpec, ValueKind, UNNAMED_PAGE};

    fn set(name: &str, pages: &[&str]) -> ConfigSet {
        ConfigSet::new(name, FakeBackend::shared(&["a"])).with_pages(pages.iter().copied())
    }

    #[test]
    fn test_add_set_rejects_duplicate_set_name() {
        let mut config = Configuration::new();
        config.add_set(set("app", &[])).unwrap();
        let err = config.add_set(set("app", &[])).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(name) if name == "app"));
    }

    #[test]
    fn test_add_set_rejects_property_key_registered_elsewhere() {
        // Arrange
        let mut config = Configuration::new();
        let mut first = set("first", &[]);
        first.add_property(ctx("shared", ValueKind::Int32, "0", None)).unwrap();
        config.add_set(first).unwrap();
        let mut second = set("second", &[]);
        second.add_property(ctx("shared", ValueKind::Int32, "0", None)).unwrap();

        // Act
        let result = config.add_set(second);

        // Assert
        assert!(matches!(result, Err(ConfigError::AlreadyExists(key)) if key == "shared"));
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_add_property_checks_all_sets() {
        let mut config = Configuration::new();
        config.add_set(set("a", &[])).unwrap();
        config.add_set(set("b", &[])).unwrap();
        config.add_property("a", ctx("k", ValueKind::String, "", None)).unwrap();

        assert!(matches!(
            config.add_property("b", ctx("k", ValueKind::String, "", None)),
            Err(ConfigError::AlreadyExists(_))
        ));
        assert!(matches!(
            config.add_property("missing", ctx("other", ValueKind::String, "", None)),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_resolve_page_without_sets_fails() {
        let config = Configuration::new();
        assert!(matches!(config.resolve_page("p"), Err(ConfigError::NoConfigSetRegistered)));
    }

    #[test]
    fn test_resolve_page_without_declared_pages_uses_first_set() {
        let mut config = Configuration::new();
        config.add_set(set("a", &[])).unwrap();
        config.add_set(set("b", &[])).unwrap();
        assert_eq!(config.resolve_page("anything").unwrap(), 0);
    }

    #[test]
    fn test_resolve_page_prefers_declaring_set_then_fallback() {
        // Arrange
        let mut config = Configuration::new();
        config.add_set(set("network", &["net", "proxy"])).unwrap();
        config.add_set(set("misc", &[])).unwrap();
        config.add_set(set("late", &["net"])).unwrap();

        // Act / Assert
        assert_eq!(config.resolve_page("proxy").unwrap(), 0);
        // First declaring set wins on conflict.
        assert_eq!(config.resolve_page("net").unwrap(), 0);
        assert_eq!(config.resolve_page("display").unwrap(), 1);
        assert_eq!(config.set_for_page(UNNAMED_PAGE).unwrap().name(), "misc");
    }

    #[test]
    fn test_resolve_page_unknown_page_without_fallback_is_invalid() {
        let mut config = Configuration::new();
        config.add_set(set("network", &["net"])).unwrap();
        assert!(matches!(config.resolve_page("display"), Err(ConfigError::InvalidPage(p)) if p == "display"));
    }

    #[test]
    fn test_edit_value_marks_unsaved_and_rejects_unknown_key() {
        let mut config = Configuration::new();
        let mut app = set("app", &[]);
        app.add_property(ctx("volume", ValueKind::Int32, "5", None)).unwrap();
        config.add_set(app).unwrap();

        config.edit_value("volume", &Value::Int32(7)).unwrap();
        assert_eq!(config.value("volume"), Some(&Value::Int32(7)));
        assert_eq!(config.unsaved_keys(), vec!["volume"]);
        assert!(matches!(
            config.edit_value("nope", &Value::Int32(1)),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_layout_spans_all_sets_in_registration_order() {
        let mut config = Configuration::new();
        let mut a = set("a", &[]);
        a.add_property(PropertyContext::from_spec(
            PropertySpec::builder("host", ValueKind::String).page("network").build(),
        ))
        .unwrap();
        let mut b = set("b", &[]);
        b.add_property(PropertyContext::from_spec(
            PropertySpec::builder("theme", ValueKind::String).page("display").build(),
        ))
        .unwrap();
        config.add_set(a).unwrap();
        config.add_set(b).unwrap();

        let layout = config.layout();
        assert_eq!(layout.page_names().collect::<Vec<_>>(), vec!["network", "display"]);
    }
}
