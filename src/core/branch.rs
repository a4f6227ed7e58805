//! Requirement branches: one self-contained way to satisfy a piece of logic.
//!
//! A branch ANDs three unordered term sets with an ordered list of state
//! modifiers. A list of branches ORs them together.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One alternative of an edge or location's logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementBranch {
    /// Items, skills and counters that must be held.
    pub item_requirements: BTreeSet<String>,
    /// Other logic objects that must already be reachable.
    pub location_requirements: BTreeSet<String>,
    /// Regions that must already be reachable.
    pub region_requirements: BTreeSet<String>,
    /// Ordered state changes applied while taking this branch.
    pub state_modifiers: Vec<String>,
}

impl RequirementBranch {
    /// Create an empty (always satisfied) branch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add item requirements.
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_requirements
            .extend(items.into_iter().map(Into::into));
        self
    }

    /// Add location requirements.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location_requirements
            .extend(locations.into_iter().map(Into::into));
        self
    }

    /// Add region requirements.
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.region_requirements
            .extend(regions.into_iter().map(Into::into));
        self
    }

    /// Append state modifiers, keeping their order.
    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state_modifiers
            .extend(modifiers.into_iter().map(Into::into));
        self
    }

    /// True when the branch has no requirements and no modifiers.
    pub fn is_empty(&self) -> bool {
        self.item_requirements.is_empty()
            && self.location_requirements.is_empty()
            && self.region_requirements.is_empty()
            && self.state_modifiers.is_empty()
    }

    /// Combine two branches as "first do `self`, then `next`".
    ///
    /// Term sets are unioned; modifiers of `self` come before those of `next`.
    pub fn combine(&self, next: &RequirementBranch) -> RequirementBranch {
        let mut combined = self.clone();
        combined
            .item_requirements
            .extend(next.item_requirements.iter().cloned());
        combined
            .location_requirements
            .extend(next.location_requirements.iter().cloned());
        combined
            .region_requirements
            .extend(next.region_requirements.iter().cloned());
        combined
            .state_modifiers
            .extend(next.state_modifiers.iter().cloned());
        combined
    }
}

/// Every combination of a `first` branch followed by a `then` branch.
///
/// The result has `first.len() * then.len()` entries, ordered by `first`.
pub fn cross_combine(first: &[RequirementBranch], then: &[RequirementBranch]) -> Vec<RequirementBranch> {
    first
        .iter()
        .flat_map(|a| then.iter().map(move |b| a.combine(b)))
        .collect()
}

impl fmt::Display for RequirementBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "ANY");
        }

        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.item_requirements.iter().cloned());
        parts.extend(self.location_requirements.iter().map(|l| format!("@{}", l)));
        parts.extend(self.region_requirements.iter().map(|r| format!("#{}", r)));
        parts.extend(self.state_modifiers.iter().cloned());
        write!(f, "{}", parts.join(" + "))
    }
}
