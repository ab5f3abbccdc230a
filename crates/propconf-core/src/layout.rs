//! Page → group → key tree used by presentation layers.
//!
//! Pages and groups appear in the order their first property was added;
//! keys keep registration order within their group. Properties without a
//! page land in [`UNNAMED_PAGE`]; properties without a group land in the
//! page's ungrouped bucket (`group == None`).

use crate::property::spec::{PropertySpec, UNNAMED_PAGE};

/// One group of keys within a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub name: Option<String>,
    pub keys: Vec<String>,
}

/// One page and its groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub name: String,
    pub groups: Vec<GroupLayout>,
}

impl PageEntry {
    /// All keys of the page in group order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flat_map(|g| g.keys.iter().map(String::as_str))
    }
}

/// Insertion-ordered page tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pages: Vec<PageEntry>,
}

impl PageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layout from specs in registration order.
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a PropertySpec>) -> Self {
        let mut layout = Self::new();
        for spec in specs {
            layout.add(spec);
        }
        layout
    }

    /// Places `spec` under its page and group.
    pub fn add(&mut self, spec: &PropertySpec) {
        let page_name = spec.page().unwrap_or(UNNAMED_PAGE);
        let page_idx = match self.pages.iter().position(|p| p.name == page_name) {
            Some(i) => i,
            None => {
                self.pages.push(PageEntry {
                    name: page_name.to_string(),
                    groups: Vec::new(),
                });
                self.pages.len() - 1
            }
        };
        let page = &mut self.pages[page_idx];

        let group_name = spec.group();
        let group_idx = match page.groups.iter().position(|g| g.name.as_deref() == group_name) {
            Some(i) => i,
            None => {
                page.groups.push(GroupLayout {
                    name: group_name.map(str::to_string),
                    keys: Vec::new(),
                });
                page.groups.len() - 1
            }
        };
        page.groups[group_idx].keys.push(spec.key().to_string());
    }

    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    pub fn page(&self, name: &str) -> Option<&PageEntry> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn spec(key: &str, page: Option<&str>, group: Option<&str>) -> PropertySpec {
        let mut builder = PropertySpec::builder(key, ValueKind::String);
        if let Some(p) = page {
            builder = builder.page(p);
        }
        if let Some(g) = group {
            builder = builder.group(g);
        }
        builder.build()
    }

    #[test]
    fn test_layout_keeps_first_seen_order() {
        // Arrange
        let specs = [
            spec("host", Some("network"), Some("proxy")),
            spec("theme", Some("display"), None),
            spec("port", Some("network"), Some("proxy")),
            spec("timeout", Some("network"), None),
        ];

        // Act
        let layout = PageLayout::from_specs(specs.iter());

        // Assert
        assert_eq!(layout.page_names().collect::<Vec<_>>(), vec!["network", "display"]);
        let network = layout.page("network").unwrap();
        assert_eq!(network.groups.len(), 2);
        assert_eq!(network.groups[0].name.as_deref(), Some("proxy"));
        assert_eq!(network.groups[0].keys, vec!["host", "port"]);
        assert_eq!(network.keys().collect::<Vec<_>>(), vec!["host", "port", "timeout"]);
    }

    #[test]
    fn test_pageless_properties_go_to_unnamed_page() {
        let layout = PageLayout::from_specs([spec("loose", None, None)].iter());
        assert_eq!(layout.page(UNNAMED_PAGE).unwrap().groups[0].keys, vec!["loose"]);
    }
}
