//! Token Records
//!
//! The token store owns these records; the engine only reads them.

use serde::{Deserialize, Serialize};

/// A named design value as delivered by the token store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Unique, case-sensitive identifier.
    pub name: String,

    /// Literal value or expression, possibly containing `{other.token}` references.
    pub raw_value: String,

    /// Opaque classification (color, spacing, ...). Never interpreted here.
    #[serde(default)]
    pub category: String,
}

impl Token {
    /// Create a token record.
    pub fn new(
        name: impl Into<String>,
        raw_value: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            category: category.into(),
        }
    }
}

/// A proposed new raw value for a token, as submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    pub name: String,
    pub new_raw_value: String,
}

impl ProposedChange {
    pub fn new(name: impl Into<String>, new_raw_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_raw_value: new_raw_value.into(),
        }
    }
}
