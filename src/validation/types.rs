//! Connection records, issues and reports exchanged with the editor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Point;
use crate::registry::ConnectionPoint;

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Points removed from the score per failing issue.
    pub fn deduction(self) -> f64 {
        match self {
            Self::Error => 25.0,
            Self::Warning => 10.0,
            Self::Info => 2.0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Topology,
    Compatibility,
    Layout,
    Process,
    Properties,
    Safety,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub rule_id: String,
    pub severity: Severity,
    pub category: RuleCategory,
    pub message: String,
    #[serde(default)]
    pub affected_element_ids: Vec<String>,
    #[serde(default)]
    pub suggested_fixes: Vec<String>,
}

impl ValidationIssue {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        category: RuleCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            category,
            message: message.into(),
            affected_element_ids: Vec::new(),
            suggested_fixes: Vec::new(),
        }
    }

    pub fn affecting(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.affected_element_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_fixes(mut self, fixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggested_fixes.extend(fixes.into_iter().map(Into::into));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.rule_id, self.severity, self.message)
    }
}

/// What a single rule reports for one connection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleOutcome {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
    pub score: f64,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            suggestions: Vec::new(),
            score: 100.0,
        }
    }

    /// Valid, but short of perfect; costs `(100 - score) / 10` overall.
    pub fn pass_with(score: f64, suggestions: Vec<String>) -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            suggestions,
            score,
        }
    }

    pub fn fail(issues: Vec<ValidationIssue>, score: f64) -> Self {
        Self {
            valid: false,
            issues,
            suggestions: Vec::new(),
            score,
        }
    }

    pub fn suggesting(mut self, suggestions: impl IntoIterator<Item = String>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }
}

/// A connection type: which node types it joins and which properties it needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionType {
    pub name: String,
    pub allowed_sources: Vec<String>,
    pub allowed_targets: Vec<String>,
    pub required_properties: Vec<String>,
    pub restrictions: Vec<String>,
    pub default_properties: Properties,
}

impl ConnectionType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One side of a proposed connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEnd {
    pub node_id: String,
    pub node_type: String,
    #[serde(default)]
    pub connection_point: Option<ConnectionPoint>,
    #[serde(default)]
    pub properties: Properties,
}

impl ConnectionEnd {
    pub fn new(node_id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            connection_point: None,
            properties: Properties::new(),
        }
    }

    pub fn at(mut self, point: ConnectionPoint) -> Self {
        self.connection_point = Some(point);
        self
    }
}

/// A connection submitted for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub id: String,
    pub source: ConnectionEnd,
    pub target: ConnectionEnd,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub path: Option<Vec<Point>>,
}

impl ConnectionData {
    pub fn new(
        id: impl Into<String>,
        source: ConnectionEnd,
        target: ConnectionEnd,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            connection_type,
            properties: Properties::new(),
            path: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// String-valued connection property.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// Aggregate verdict for one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
    pub score: f64,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }
}

/// Summary over many connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    /// Connections carrying at least one warning.
    pub warnings: usize,
    /// Connections that failed validation.
    pub errors: usize,
    pub average_score: f64,
    pub results: Vec<ValidationReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deductions() {
        assert_eq!(Severity::Error.deduction(), 25.0);
        assert_eq!(Severity::Warning.deduction(), 10.0);
        assert_eq!(Severity::Info.deduction(), 2.0);
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("r", Severity::Warning, RuleCategory::Layout, "bad");
        assert_eq!(issue.to_string(), "[r] warning: bad");
    }

    #[test]
    fn test_connection_json() {
        let json = r#"{
            "id": "c1",
            "source": {"nodeId": "p1", "nodeType": "pump"},
            "target": {"nodeId": "v1", "nodeType": "vessel"},
            "connectionType": {"name": "process", "requiredProperties": ["fluid"]},
            "properties": {"lineType": "process"}
        }"#;
        let c: ConnectionData = serde_json::from_str(json).unwrap();
        assert_eq!(c.connection_type.required_properties, vec!["fluid".to_string()]);
        assert_eq!(c.property_str("lineType"), Some("process"));
        assert!(c.source.connection_point.is_none());
        assert!(c.path.is_none());
    }
}
