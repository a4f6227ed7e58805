//! Reading the tokenized logic document.
//!
//! The document is the hand-off from the logic-parsing stage: every object
//! already carries its DNF clauses as token lists, so this module only checks
//! shapes and decodes tokens into [`LogicObject`]s.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::StatefulClause;
use crate::error::{RegraphError, Result};
use crate::graph::{LogicObject, ObjectKind};

/// One conjunctive clause as tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseSpec {
    /// Object whose state this clause continues from. Absent means the root.
    pub provider: Option<String>,
    /// Condition tokens such as `Sword` or `SIMPLE>1`.
    pub conditions: Vec<String>,
    /// State modifier tokens such as `$TAKEDAMAGE`.
    pub modifiers: Vec<String>,
}

/// One logic object as tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub event: bool,
    #[serde(default)]
    pub clauses: Vec<ClauseSpec>,
}

/// The whole input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDocument {
    /// Name of the root region. Falls back to the configured root.
    pub start: Option<String>,
    /// Regions that must survive cleanup.
    pub keep_regions: Vec<String>,
    pub objects: Vec<ObjectSpec>,
}

impl InputDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a document, refusing files larger than `max_bytes`.
    pub fn load(path: &Path, max_bytes: u64) -> Result<Self> {
        let text = read_to_string_with_limit(path, max_bytes)?;
        Self::from_json(&text).map_err(|e| match e {
            RegraphError::Serde { message } => {
                RegraphError::serde(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Decode every object.
    ///
    /// Fails on blank or duplicate names and on the first malformed
    /// condition token.
    pub fn to_logic_objects(&self) -> Result<Vec<LogicObject>> {
        let mut seen = BTreeSet::new();
        let mut objects = Vec::with_capacity(self.objects.len());

        for entry in &self.objects {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(RegraphError::invalid_input("object with an empty name"));
            }
            if !seen.insert(name.to_string()) {
                return Err(RegraphError::invalid_input(format!(
                    "object {} is defined more than once",
                    name
                )));
            }

            let mut object = LogicObject::new(name, entry.kind);
            object.event = entry.event;
            for clause in &entry.clauses {
                object.clauses.push(StatefulClause::from_tokens(
                    name,
                    clause.provider.as_deref(),
                    &clause.conditions,
                    &clause.modifiers,
                )?);
            }
            objects.push(object);
        }

        Ok(objects)
    }
}

/// Read a file into a string, refusing files larger than `max_size` bytes.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| RegraphError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(RegraphError::invalid_input(format!(
            "file {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| RegraphError::storage(path, e))
}
