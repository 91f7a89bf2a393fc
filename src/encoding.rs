//! Category encoding for the `f2` feature.
//!
//! The label set is closed: `c0`, `c1` and `c2` map to `0`, `1` and `2`.
//! Matching is exact and case-sensitive, and there is no fallback code.
//! Adding a category is a code change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Static label -> code table.
const CATEGORY_TABLE: [(&str, u8); 3] = [("c0", 0), ("c1", 1), ("c2", 2)];

/// Integer code of a recognized `f2` category.
///
/// Only codes present in the category table can be constructed, including
/// through deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct CategoryCode(u8);

impl CategoryCode {
    /// Every recognized code, in table order.
    pub const ALL: [CategoryCode; 3] = [CategoryCode(0), CategoryCode(1), CategoryCode(2)];

    /// Numeric value of the code.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Label this code was encoded from.
    pub fn label(self) -> &'static str {
        // Codes are table indices.
        CATEGORY_TABLE[usize::from(self.0)].0
    }

    /// Code as a model input column.
    pub fn as_feature(self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CategoryCode> for u8 {
    fn from(code: CategoryCode) -> Self {
        code.0
    }
}

impl TryFrom<u8> for CategoryCode {
    type Error = InvalidCategoryCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CATEGORY_TABLE
            .iter()
            .find(|(_, code)| *code == value)
            .map(|(_, code)| CategoryCode(*code))
            .ok_or(InvalidCategoryCode(value))
    }
}

/// A numeric code with no entry in the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid category code {0}")]
pub struct InvalidCategoryCode(pub u8);

/// Lookup failure: the label is not in the category table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category provided for f2 - '{label}'")]
pub struct UnknownCategory {
    pub label: String,
}

/// Encode a category label.
pub fn encode(label: &str) -> Result<CategoryCode, UnknownCategory> {
    CATEGORY_TABLE
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, code)| CategoryCode(*code))
        .ok_or_else(|| UnknownCategory {
            label: label.to_string(),
        })
}
