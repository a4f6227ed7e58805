//! Stateful clauses: one conjunctive term of a DNF logic formula.
//!
//! The logic parser delivers each clause as token text. Tokens are decoded
//! into [`Term`]s here and later partitioned into item and location
//! requirements by the graph builder.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{RegraphError, Result};

/// Comparison operator inside a comparison-shaped term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOp {
    Less,
    Greater,
    Equal,
}

impl ComparisonOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(ComparisonOp::Less),
            '>' => Some(ComparisonOp::Greater),
            '=' => Some(ComparisonOp::Equal),
            _ => None,
        }
    }

    /// The operator's token character.
    pub fn symbol(&self) -> char {
        match self {
            ComparisonOp::Less => '<',
            ComparisonOp::Greater => '>',
            ComparisonOp::Equal => '=',
        }
    }
}

/// Token shape of a plain (non-modifier) condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A bare name: an item, a skill, or a reference to another logic object.
    Simple(String),
    /// A numeric comparison against a counter, e.g. `GRUBS>5`.
    Comparison {
        left: String,
        op: ComparisonOp,
        right: String,
    },
    /// `left?right`: use `left` if it is defined, otherwise `right`.
    Coalesce { left: String, right: String },
}

/// Characters that only appear in un-flattened infix logic.
const INFIX_CHARS: &[char] = &['(', ')', '|', '+', ' ', '\t'];

impl Term {
    /// Decode a token. Returns `None` for empty tokens, operators with a
    /// missing operand, and leftover infix syntax.
    pub fn parse(token: &str) -> Option<Term> {
        let token = token.trim();
        if token.is_empty() || token.contains(INFIX_CHARS) {
            return None;
        }

        if let Some((left, right)) = token.split_once('?') {
            if left.is_empty() || right.is_empty() {
                return None;
            }
            return Some(Term::Coalesce {
                left: left.to_string(),
                right: right.to_string(),
            });
        }

        if let Some(idx) = token.find(['<', '>', '=']) {
            let op = token[idx..].chars().next().and_then(ComparisonOp::from_char)?;
            let left = &token[..idx];
            let right = &token[idx + 1..];
            if left.is_empty() || right.is_empty() {
                return None;
            }
            return Some(Term::Comparison {
                left: left.to_string(),
                op,
                right: right.to_string(),
            });
        }

        Some(Term::Simple(token.to_string()))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Simple(name) => write!(f, "{}", name),
            Term::Comparison { left, op, right } => write!(f, "{}{}{}", left, op.symbol(), right),
            Term::Coalesce { left, right } => write!(f, "{}?{}", left, right),
        }
    }
}

/// Requirements of a clause split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedTerms {
    /// Terms that name items or compare counters.
    pub items: BTreeSet<String>,
    /// Terms that name other logic objects.
    pub locations: BTreeSet<String>,
}

/// One conjunctive term of a DNF formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatefulClause {
    /// Logic object whose state this clause continues from. `None` means the
    /// clause starts from the root region.
    pub provider: Option<String>,
    /// Stateless conditions, all of which must hold.
    pub conditions: Vec<Term>,
    /// Ordered state modifiers applied along the way.
    pub modifiers: Vec<String>,
}

impl StatefulClause {
    /// Create a clause from already decoded parts.
    pub fn new(provider: Option<String>, conditions: Vec<Term>, modifiers: Vec<String>) -> Self {
        Self {
            provider,
            conditions,
            modifiers,
        }
    }

    /// Decode a clause from token text.
    ///
    /// `object` names the logic object the clause belongs to and is only used
    /// for error reporting.
    pub fn from_tokens(
        object: &str,
        provider: Option<&str>,
        conditions: &[String],
        modifiers: &[String],
    ) -> Result<Self> {
        let conditions = conditions
            .iter()
            .map(|token| {
                Term::parse(token).ok_or_else(|| RegraphError::malformed_term(object, token.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;

        let modifiers = modifiers
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            provider: provider
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            conditions,
            modifiers,
        })
    }

    /// Split conditions into item and location requirements.
    ///
    /// A simple term naming one of `known_objects` is a location requirement;
    /// every other simple or comparison term is an item requirement. A
    /// coalescing term cannot be classified and fails the whole clause.
    pub fn partition(&self, object: &str, known_objects: &BTreeSet<String>) -> Result<PartitionedTerms> {
        let mut partitioned = PartitionedTerms::default();

        for term in &self.conditions {
            match term {
                Term::Simple(name) if known_objects.contains(name) => {
                    partitioned.locations.insert(name.clone());
                }
                Term::Simple(name) => {
                    partitioned.items.insert(name.clone());
                }
                Term::Comparison { .. } => {
                    partitioned.items.insert(term.to_string());
                }
                Term::Coalesce { .. } => {
                    return Err(RegraphError::malformed_term(object, term.to_string()));
                }
            }
        }

        Ok(partitioned)
    }
}
