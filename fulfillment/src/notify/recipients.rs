//! Recipient resolution
//!
//! Orders are routed to processing teams by (region, bucket). The directory
//! is static configuration; lookup walks a fallback chain so that a region
//! without a dedicated team drops through to the catch-all tiers:
//!
//! ```text
//! (region, bucket) → (region, Other) → (Other, bucket) → (Other, Other)
//! ```
//!
//! The first non-empty tier wins. Addresses are deduplicated
//! case-insensitively, preserving first-seen order.

use shared::models::{ProcessorAssignment, TrainingSession};
use shared::order::{MaterialsFormat, MaterialsOrder, OrderType};
use std::collections::HashMap;
use std::path::Path;

/// Catch-all key used for both region and bucket tiers
pub const OTHER: &str = "Other";

/// Coarse notification-routing category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Simulation,
    Digital,
    Physical,
    Other,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulation => "Simulation",
            Self::Digital => "Digital",
            Self::Physical => "Physical",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the routing bucket for an order in its session context
///
/// Simulation wins over format: a simulation-based workshop routes to the
/// simulation team even when physical materials are attached.
pub fn bucket_for(order: &MaterialsOrder, session: &TrainingSession) -> Bucket {
    if order.order_type == OrderType::Simulation
        || session.workshop_type.simulation_based
        || order.materials_format == Some(MaterialsFormat::SimOnly)
    {
        return Bucket::Simulation;
    }
    match order.materials_format {
        Some(MaterialsFormat::AllDigital) => Bucket::Digital,
        Some(MaterialsFormat::AllPhysical) | Some(MaterialsFormat::Mixed) => Bucket::Physical,
        _ => Bucket::Other,
    }
}

/// Static (region, bucket) → processor mailboxes directory
#[derive(Debug, Clone, Default)]
pub struct RecipientDirectory {
    /// Keyed by lowercased (region, bucket)
    assignments: HashMap<(String, String), Vec<String>>,
}

impl RecipientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from assignment entries
    ///
    /// Multiple entries for the same (region, bucket) are concatenated in
    /// configuration order.
    pub fn from_assignments(entries: impl IntoIterator<Item = ProcessorAssignment>) -> Self {
        let mut directory = Self::new();
        for entry in entries {
            directory.add(entry);
        }
        directory
    }

    /// Load assignments from a JSON file (an array of entries)
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<ProcessorAssignment> = serde_json::from_str(&raw)?;
        Ok(Self::from_assignments(entries))
    }

    /// Add one assignment entry
    pub fn add(&mut self, entry: ProcessorAssignment) {
        let key = (entry.region.to_lowercase(), entry.bucket.to_lowercase());
        self.assignments.entry(key).or_default().extend(entry.emails);
    }

    fn tier(&self, region: &str, bucket: &str) -> Option<&Vec<String>> {
        self.assignments
            .get(&(region.to_lowercase(), bucket.to_lowercase()))
            .filter(|emails| !emails.is_empty())
    }

    /// Resolve the recipient list for (region, bucket)
    ///
    /// Walks the fallback chain; returns an empty list when every tier is
    /// empty.
    pub fn resolve(&self, region: &str, bucket: Bucket) -> Vec<String> {
        let bucket = bucket.as_str();
        let chain = [
            (region, bucket),
            (region, OTHER),
            (OTHER, bucket),
            (OTHER, OTHER),
        ];

        for (tier_region, tier_bucket) in chain {
            if let Some(emails) = self.tier(tier_region, tier_bucket) {
                return dedup_case_insensitive(emails);
            }
        }
        Vec::new()
    }
}

/// Deduplicate addresses case-insensitively, preserving first-seen order
fn dedup_case_insensitive(emails: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    emails
        .iter()
        .filter(|e| seen.insert(e.to_lowercase()))
        .cloned()
        .collect()
}
