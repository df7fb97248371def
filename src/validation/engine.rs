//! Rule engine scoring connections against the registered rules.

use serde_json::Value;
use tracing::{debug, trace};

use super::compatibility::{Compatibility, CompatibilityMatrix};
use super::connection_types::ConnectionTypeRegistry;
use super::rules::{Rule, RuleContext, RuleInfo, default_rules};
use super::types::{
    BatchSummary, ConnectionData, ConnectionType, Properties, Severity, ValidationReport,
};

const FULL_SCORE: f64 = 100.0;

/// Validates connections against an insertion-ordered rule set.
pub struct ConnectionValidator {
    rules: Vec<Box<dyn Rule>>,
    compatibility: CompatibilityMatrix,
    connection_types: ConnectionTypeRegistry,
}

impl Default for ConnectionValidator {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            compatibility: CompatibilityMatrix::builtin(),
            connection_types: ConnectionTypeRegistry::builtin(),
        }
    }
}

impl ConnectionValidator {
    /// Validator with the built-in rules, matrix and connection types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with no rules and empty tables.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            compatibility: CompatibilityMatrix::empty(),
            connection_types: ConnectionTypeRegistry::empty(),
        }
    }

    /// Register a rule. An existing id is replaced in place, keeping its position.
    pub fn add_rule(&mut self, rule: impl Rule + 'static) {
        self.add_boxed_rule(Box::new(rule));
    }

    pub fn add_boxed_rule(&mut self, rule: Box<dyn Rule>) {
        match self.rules.iter().position(|r| r.id() == rule.id()) {
            Some(idx) => self.rules[idx] = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id() != id);
        self.rules.len() != before
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn rule_infos(&self) -> Vec<RuleInfo> {
        self.rules().map(RuleInfo::of).collect()
    }

    pub fn compatibility(&self) -> &CompatibilityMatrix {
        &self.compatibility
    }

    pub fn add_compatibility(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        rule: Compatibility,
    ) {
        self.compatibility.set(source, target, rule);
    }

    pub fn remove_compatibility(&mut self, source: &str, target: &str) -> Option<Compatibility> {
        self.compatibility.remove(source, target)
    }

    pub fn connection_types(&self) -> &ConnectionTypeRegistry {
        &self.connection_types
    }

    pub fn add_connection_type(&mut self, connection_type: ConnectionType) {
        self.connection_types.add(connection_type);
    }

    pub fn remove_connection_type(&mut self, name: &str) -> Option<ConnectionType> {
        self.connection_types.remove(name)
    }

    /// Run every rule and fold the outcomes into one report.
    ///
    /// Failing rules cost `deduction(severity)` per issue; passing rules with
    /// a partial score cost a tenth of the shortfall. Only error-severity
    /// issues make the connection invalid.
    pub fn validate_connection(&self, connection: &ConnectionData) -> ValidationReport {
        let ctx = RuleContext {
            compatibility: &self.compatibility,
            connection_types: &self.connection_types,
        };

        let mut issues = Vec::new();
        let mut suggestions: Vec<String> = Vec::new();
        let mut score = FULL_SCORE;

        for rule in &self.rules {
            let outcome = rule.evaluate(connection, &ctx);
            trace!(rule = rule.id(), valid = outcome.valid, score = outcome.score, "rule evaluated");

            for s in outcome.suggestions {
                if !suggestions.contains(&s) {
                    suggestions.push(s);
                }
            }
            if !outcome.valid {
                score -= rule.severity().deduction() * outcome.issues.len() as f64;
                issues.extend(outcome.issues);
            } else if outcome.score < FULL_SCORE {
                score -= (FULL_SCORE - outcome.score) / 10.0;
            }
        }

        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        let score = score.clamp(0.0, FULL_SCORE);
        debug!(connection = %connection.id, valid, score, issues = issues.len(), "connection validated");

        ValidationReport {
            valid,
            issues,
            suggestions,
            score,
        }
    }

    pub fn validate_connections(&self, connections: &[ConnectionData]) -> BatchSummary {
        let results: Vec<ValidationReport> = connections
            .iter()
            .map(|c| self.validate_connection(c))
            .collect();

        let total = results.len();
        let average_score = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.score).sum::<f64>() / total as f64
        };

        BatchSummary {
            total,
            valid: results.iter().filter(|r| r.valid).count(),
            warnings: results.iter().filter(|r| r.has_warnings()).count(),
            errors: results.iter().filter(|r| !r.valid).count(),
            average_score,
            results,
        }
    }

    pub fn are_nodes_compatible(&self, source_type: &str, target_type: &str) -> bool {
        self.compatibility.is_allowed(source_type, target_type)
    }

    /// Property defaults for a new connection of `connection_type_name`.
    ///
    /// Starts from the type's defaults (plus `lineType`), then adds the
    /// matrix restrictions for the node-type pair when there are any.
    pub fn suggested_properties(
        &self,
        source_type: &str,
        target_type: &str,
        connection_type_name: &str,
    ) -> Properties {
        let mut props = Properties::new();
        if let Some(ct) = self.connection_types.get(connection_type_name) {
            props.extend(ct.default_properties.clone());
            props
                .entry("lineType")
                .or_insert_with(|| Value::from(connection_type_name));
        }
        if let Some(entry) = self.compatibility.get(source_type, target_type)
            && !entry.restrictions.is_empty()
        {
            props.insert(
                "restrictions".to_string(),
                Value::from(entry.restrictions.clone()),
            );
        }
        props
    }
}
