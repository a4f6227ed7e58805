//! Core logic types for regraph.
//!
//! This module contains requirement branches, stateful clauses, the modifier
//! classifier and the dominance test that the graph builder is built on.

pub mod branch;
pub mod clause;
pub mod dominance;
pub mod modifier;

pub use branch::{cross_combine, RequirementBranch};
pub use clause::{ComparisonOp, PartitionedTerms, StatefulClause, Term};
pub use dominance::{dominates, eliminate_redundant};
pub use modifier::{classify_many, classify_single, ModifierEffect};
