//! Test proposals returned by the generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single proposed test scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestProposal {
    /// UI area the proposal belongs to; used as the directory name.
    pub category: String,

    /// camelCase identifier; used as the file stem.
    #[serde(rename = "test-name")]
    pub test_name: String,

    pub description: String,

    /// Features, commands or code areas the test exercises.
    #[serde(default)]
    pub cover: Vec<String>,
}

impl TestProposal {
    /// File name the generated test is written to.
    pub fn file_name(&self) -> String {
        format!("{}.test.ts", self.test_name)
    }
}

/// A batch of proposals plus generation metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestGenerationResult {
    pub proposals: Vec<TestProposal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl TestGenerationResult {
    pub fn new(proposals: Vec<TestProposal>) -> Self {
        Self {
            proposals,
            summary: None,
            generated_at: Utc::now(),
        }
    }

    /// Parse a cleaned generator response as a JSON array of proposals.
    pub fn from_json(cleaned: &str) -> serde_json::Result<Self> {
        let proposals: Vec<TestProposal> = serde_json::from_str(cleaned)?;
        Ok(Self::new(proposals))
    }

    /// First `limit` proposals in original order; all of them when the
    /// limit is `None`.
    pub fn limited(&self, limit: Option<usize>) -> &[TestProposal] {
        match limit {
            Some(n) => &self.proposals[..n.min(self.proposals.len())],
            None => &self.proposals,
        }
    }
}

/// Normalize a configured proposal limit: only positive finite values
/// limit, and they are floored.
pub fn normalize_limit(raw: Option<f64>) -> Option<usize> {
    match raw {
        Some(v) if v.is_finite() && v >= 1.0 => Some(v.floor() as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"category": "views", "test-name": "welcomeViewOpens", "description": "d1", "cover": ["a"]},
        {"category": "commands", "test-name": "createProject", "description": "d2", "cover": []},
        {"category": "menus", "test-name": "submenuOrder", "description": "d3"}
    ]"#;

    #[test]
    fn test_from_json_reads_hyphenated_name() {
        let result = TestGenerationResult::from_json(SAMPLE).expect("parse");
        assert_eq!(result.proposals.len(), 3);
        assert_eq!(result.proposals[0].test_name, "welcomeViewOpens");
        assert_eq!(result.proposals[0].file_name(), "welcomeViewOpens.test.ts");
        assert!(result.proposals[2].cover.is_empty());
    }

    #[test]
    fn test_limited_preserves_order() {
        let result = TestGenerationResult::from_json(SAMPLE).expect("parse");
        let names: Vec<_> = result
            .limited(Some(2))
            .iter()
            .map(|p| p.test_name.as_str())
            .collect();
        assert_eq!(names, vec!["welcomeViewOpens", "createProject"]);
        assert_eq!(result.limited(Some(10)).len(), 3);
        assert_eq!(result.limited(None).len(), 3);
    }

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(Some(3.7)), Some(3));
        assert_eq!(normalize_limit(Some(0.0)), None);
        assert_eq!(normalize_limit(Some(-2.0)), None);
        assert_eq!(normalize_limit(Some(f64::NAN)), None);
        assert_eq!(normalize_limit(None), None);
    }

    #[test]
    fn test_from_json_rejects_object() {
        assert!(TestGenerationResult::from_json(r#"{"category":"x"}"#).is_err());
    }
}
