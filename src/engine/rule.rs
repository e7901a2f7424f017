//! The rule contract.

use super::fix::Fix;
use super::params::Params;
use crate::error::{Error, Result};
use crate::model::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Page size and margins
    Page,
    /// Fonts, sizes and colours
    Font,
    /// Paragraph spacing and indentation
    Paragraph,
    /// Heading formatting
    Heading,
    /// List markers
    List,
    /// Table layout and borders
    Table,
    /// Images and diagrams
    Image,
    /// Mathematics
    Formula,
}

impl Category {
    /// All categories.
    pub const ALL: [Category; 8] = [
        Category::Page,
        Category::Font,
        Category::Paragraph,
        Category::Heading,
        Category::List,
        Category::Table,
        Category::Image,
        Category::Formula,
    ];

    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Page => "page",
            Category::Font => "font",
            Category::Paragraph => "paragraph",
            Category::Heading => "heading",
            Category::List => "list",
            Category::Table => "table",
            Category::Image => "image",
            Category::Formula => "formula",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown rule category: {}", s)))
    }
}

/// Rule description exposed to callers (catalogue listings, presets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Unique rule id
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: Category,
    /// What the rule does
    pub description: String,
    /// Execution priority (lower runs first)
    pub priority: i32,
    /// Declared parameter defaults
    pub default_params: Map<String, Value>,
}

/// A formatting rule.
///
/// Rules mutate the document in place and report what they changed as
/// [`Fix`] records. They should check current values before recording a
/// fix, so that running twice on a converged document reports nothing new.
pub trait Rule: Send + Sync {
    /// Unique id.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Category.
    fn category(&self) -> Category;

    /// What the rule does.
    fn description(&self) -> &str {
        ""
    }

    /// Execution priority; lower runs earlier.
    fn priority(&self) -> i32 {
        100
    }

    /// Declared parameter defaults.
    fn default_params(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Apply the rule to a document.
    fn apply(&self, doc: &mut Document, params: &Params) -> Result<Vec<Fix>>;

    /// Metadata snapshot.
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: self.id().to_string(),
            name: self.name().to_string(),
            category: self.category(),
            description: self.description().to_string(),
            priority: self.priority(),
            default_params: self.default_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Rule for Noop {
        fn id(&self) -> &str {
            "noop"
        }
        fn name(&self) -> &str {
            "No-op"
        }
        fn category(&self) -> Category {
            Category::Paragraph
        }
        fn apply(&self, _doc: &mut Document, _params: &Params) -> Result<Vec<Fix>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = Noop.metadata();
        assert_eq!(meta.priority, 100);
        assert_eq!(meta.category, Category::Paragraph);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["category"], "paragraph");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Table".parse::<Category>().unwrap(), Category::Table);
        assert!("colour".parse::<Category>().is_err());
    }
}
