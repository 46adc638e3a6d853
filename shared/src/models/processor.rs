//! Processor routing assignments
//!
//! Static configuration mapping (region, bucket) to the processing team
//! mailboxes that handle materials orders for that slice.

use serde::{Deserialize, Serialize};

/// One routing assignment entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorAssignment {
    /// Region code, or "Other" for the catch-all tier
    pub region: String,
    /// Routing bucket name: "Simulation" | "Digital" | "Physical" | "Other"
    pub bucket: String,
    pub emails: Vec<String>,
}
