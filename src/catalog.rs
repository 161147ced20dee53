//! Option Catalogs - Static `{value, label}` Sequences
//!
//! Catalogs are configuration data, not computed. Every choice field
//! resolves user input against one of these.

use serde::{Deserialize, Serialize};

use crate::forms::{enum_catalog, CommunicationMethod, Priority, ReassignmentReason, RequestType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Ordered option list for a single choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalog {
    pub name: String,
    pub options: Vec<OptionItem>,
}

impl OptionCatalog {
    pub fn new(name: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            options: options
                .iter()
                .map(|(value, label)| OptionItem::new(value, label))
                .collect(),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.value.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Label for a canonical value, falling back to the value itself
    pub fn label_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map_or(value, |o| o.label.as_str())
    }

    /// Resolve free input to its canonical value.
    ///
    /// Matches the value first, then the label, both case-insensitively.
    pub fn canonical(&self, input: &str) -> Option<&str> {
        let needle = input.trim();
        if needle.is_empty() {
            return None;
        }
        self.options
            .iter()
            .find(|o| o.value.eq_ignore_ascii_case(needle))
            .or_else(|| {
                self.options
                    .iter()
                    .find(|o| o.label.eq_ignore_ascii_case(needle))
            })
            .map(|o| o.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

pub const AGENTS: &str = "agents";
pub const REASSIGNMENT_REASONS: &str = "reassignment_reasons";
pub const REQUEST_TYPES: &str = "request_types";
pub const PACKAGES: &str = "packages";
pub const CONCERNS: &str = "concerns";
pub const PRIORITIES: &str = "priorities";
pub const COMMUNICATION_METHODS: &str = "communication_methods";

/// Every catalog the built-in forms draw on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogs {
    pub agents: OptionCatalog,
    pub reassignment_reasons: OptionCatalog,
    pub request_types: OptionCatalog,
    pub packages: OptionCatalog,
    pub concerns: OptionCatalog,
    pub priorities: OptionCatalog,
    pub communication_methods: OptionCatalog,
}

impl Catalogs {
    pub fn get(&self, name: &str) -> Option<&OptionCatalog> {
        match name {
            AGENTS => Some(&self.agents),
            REASSIGNMENT_REASONS => Some(&self.reassignment_reasons),
            REQUEST_TYPES => Some(&self.request_types),
            PACKAGES => Some(&self.packages),
            CONCERNS => Some(&self.concerns),
            PRIORITIES => Some(&self.priorities),
            COMMUNICATION_METHODS => Some(&self.communication_methods),
            _ => None,
        }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut OptionCatalog> {
        match name {
            AGENTS => Some(&mut self.agents),
            REASSIGNMENT_REASONS => Some(&mut self.reassignment_reasons),
            REQUEST_TYPES => Some(&mut self.request_types),
            PACKAGES => Some(&mut self.packages),
            CONCERNS => Some(&mut self.concerns),
            PRIORITIES => Some(&mut self.priorities),
            COMMUNICATION_METHODS => Some(&mut self.communication_methods),
            _ => None,
        }
    }

    /// Catalogs backed by a typed enum; their options cannot change
    pub fn is_fixed(name: &str) -> bool {
        matches!(
            name,
            REASSIGNMENT_REASONS | REQUEST_TYPES | PRIORITIES | COMMUNICATION_METHODS
        )
    }

    /// Replace the options of a named catalog.
    ///
    /// Returns false when no such catalog exists or it is fixed.
    pub fn override_options(&mut self, name: &str, options: Vec<OptionItem>) -> bool {
        if Self::is_fixed(name) {
            return false;
        }
        match self.get_mut(name) {
            Some(catalog) => {
                catalog.options = options;
                true
            }
            None => false,
        }
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            agents: OptionCatalog::new(
                AGENTS,
                &[
                    ("agent1", "John Doe"),
                    ("agent2", "Jane Smith"),
                    ("agent3", "Mike Johnson"),
                ],
            ),
            reassignment_reasons: enum_catalog::<ReassignmentReason>(REASSIGNMENT_REASONS),
            request_types: enum_catalog::<RequestType>(REQUEST_TYPES),
            packages: OptionCatalog::new(
                PACKAGES,
                &[
                    ("standard", "Standard Package"),
                    ("premium", "Premium Package"),
                    ("custom", "Custom Package"),
                ],
            ),
            concerns: OptionCatalog::new(
                CONCERNS,
                &[
                    ("manuscript-review", "Manuscript Review"),
                    ("cover-design", "Cover Design"),
                    ("marketing-support", "Marketing Support"),
                    ("editing", "Editing"),
                    ("distribution", "Distribution"),
                    ("others", "Others"),
                ],
            ),
            priorities: enum_catalog::<Priority>(PRIORITIES),
            communication_methods: enum_catalog::<CommunicationMethod>(COMMUNICATION_METHODS),
        }
    }
}
