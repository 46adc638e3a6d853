//! Catalog collaborator seam
//!
//! The materials catalog (options, simulation outlines, default rules,
//! region labels) is owned by another system. The engine consumes it through
//! [`CatalogProvider`]; [`StaticCatalog`] is the in-memory implementation
//! used for fixtures and tests.

use shared::models::{CatalogOption, DefaultRule, DeliveryType, SimulationOutline};
use std::collections::HashMap;

/// Read-only catalog access
pub trait CatalogProvider: Send + Sync {
    /// Look up a catalog option by reference (`"<kind>:<id>"`)
    fn option(&self, catalog_ref: &str) -> Option<CatalogOption>;

    /// Look up a simulation outline by ID
    fn outline(&self, outline_id: &str) -> Option<SimulationOutline>;

    /// Default line-item rules for a workshop type, matched on
    /// (delivery_type, region, language)
    fn default_rules(
        &self,
        workshop_type: &str,
        delivery_type: DeliveryType,
        region: &str,
        language: &str,
    ) -> Vec<DefaultRule>;

    /// Display label for a region code; falls back to the code itself
    fn region_label(&self, code: &str) -> String;
}

/// In-memory catalog, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    options: HashMap<String, CatalogOption>,
    outlines: HashMap<String, SimulationOutline>,
    default_rules: Vec<DefaultRule>,
    region_labels: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog option, keyed by its reference
    pub fn with_option(mut self, option: CatalogOption) -> Self {
        self.options.insert(option.id.clone(), option);
        self
    }

    /// Add a simulation outline
    pub fn with_outline(mut self, outline: SimulationOutline) -> Self {
        self.outlines.insert(outline.id.clone(), outline);
        self
    }

    /// Add a default rule
    pub fn with_default_rule(mut self, rule: DefaultRule) -> Self {
        self.default_rules.push(rule);
        self
    }

    /// Add a region display label
    pub fn with_region_label(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.region_labels.insert(code.into(), label.into());
        self
    }
}

impl CatalogProvider for StaticCatalog {
    fn option(&self, catalog_ref: &str) -> Option<CatalogOption> {
        self.options.get(catalog_ref).cloned()
    }

    fn outline(&self, outline_id: &str) -> Option<SimulationOutline> {
        self.outlines.get(outline_id).cloned()
    }

    fn default_rules(
        &self,
        workshop_type: &str,
        delivery_type: DeliveryType,
        region: &str,
        language: &str,
    ) -> Vec<DefaultRule> {
        self.default_rules
            .iter()
            .filter(|r| {
                r.workshop_type == workshop_type
                    && r.delivery_type == delivery_type
                    && r.region == region
                    && r.language == language
            })
            .cloned()
            .collect()
    }

    fn region_label(&self, code: &str) -> String {
        self.region_labels
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }
}
