//! Fix records: one entry per discrete change a rule makes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a fix was applied or only attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixStatus {
    /// The change was made
    #[default]
    Applied,
    /// The change could not be made; the element needs manual attention
    Failed,
}

impl FixStatus {
    /// Whether this is the applied status.
    pub fn is_applied(&self) -> bool {
        *self == FixStatus::Applied
    }
}

/// A structured record of one change made by a rule.
///
/// Built once with the `with_*` methods and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Fix identifier, unique within one rule's output
    pub id: String,

    /// Rule that produced the fix
    pub rule_id: String,

    /// Human-readable description
    pub description: String,

    /// Affected paragraph indices (paragraph-only numbering)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraph_indices: Vec<usize>,

    /// Affected table indices (table-only numbering)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_indices: Vec<usize>,

    /// Value before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Value after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Free-form location metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,

    /// Applied or failed
    #[serde(default, skip_serializing_if = "FixStatus::is_applied")]
    pub status: FixStatus,
}

impl Fix {
    /// Create a fix record.
    pub fn new(
        id: impl Into<String>,
        rule_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rule_id: rule_id.into(),
            description: description.into(),
            paragraph_indices: Vec::new(),
            table_indices: Vec::new(),
            before: None,
            after: None,
            location: None,
            status: FixStatus::Applied,
        }
    }

    /// Add one affected paragraph.
    pub fn with_paragraph(mut self, index: usize) -> Self {
        self.paragraph_indices.push(index);
        self
    }

    /// Set the affected paragraphs.
    pub fn with_paragraphs(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.paragraph_indices.extend(indices);
        self
    }

    /// Add one affected table.
    pub fn with_table(mut self, index: usize) -> Self {
        self.table_indices.push(index);
        self
    }

    /// Set the before snapshot.
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    /// Set the after snapshot.
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Set location metadata.
    pub fn with_location(mut self, location: Value) -> Self {
        self.location = Some(location);
        self
    }

    /// Mark the fix as failed.
    pub fn failed(mut self) -> Self {
        self.status = FixStatus::Failed;
        self
    }

    /// Whether the change was made.
    pub fn is_applied(&self) -> bool {
        self.status.is_applied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_wire_shape() {
        let fix = Fix::new("fix_title_bold_0", "title_bold", "Bolded heading").with_paragraph(0);
        let value = serde_json::to_value(&fix).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "fix_title_bold_0",
                "rule_id": "title_bold",
                "description": "Bolded heading",
                "paragraph_indices": [0]
            })
        );
    }

    #[test]
    fn test_full_wire_shape() {
        let fix = Fix::new("err_latex_2", "latex_to_omml", "Could not convert")
            .with_table(1)
            .with_before("$x$")
            .with_after("x")
            .with_location(json!({"type": "formula"}))
            .failed();
        let value = serde_json::to_value(&fix).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["table_indices"], json!([1]));
        assert_eq!(value["location"]["type"], "formula");
        assert!(value.get("paragraph_indices").is_none());

        let back: Fix = serde_json::from_value(value).unwrap();
        assert_eq!(back, fix);
        assert!(!back.is_applied());
    }
}
