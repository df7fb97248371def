//! Pluggable validation rules and the built-in rule set.

use serde::{Deserialize, Serialize};

use super::compatibility::CompatibilityMatrix;
use super::connection_types::ConnectionTypeRegistry;
use super::types::{ConnectionData, RuleCategory, RuleOutcome, Severity, ValidationIssue};

pub const NO_SELF_CONNECTION: &str = "no-self-connection";
pub const DIRECTION_MISMATCH: &str = "connection-direction-mismatch";
pub const NODE_TYPE_COMPATIBILITY: &str = "node-type-compatibility";
pub const PROCESS_FLOW_DIRECTION: &str = "process-flow-direction";
pub const REQUIRED_PROPERTIES: &str = "required-properties";
pub const CONNECTION_TYPE_ENDPOINTS: &str = "connection-type-endpoints";

const FLOW_SOURCES: [&str; 3] = ["pump", "vessel", "tank"];
const FLOW_TARGETS: [&str; 3] = ["vessel", "tank", "heat-exchanger"];

/// Lookup tables a rule may consult.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub compatibility: &'a CompatibilityMatrix,
    pub connection_types: &'a ConnectionTypeRegistry,
}

/// A named, severity-tagged predicate over a connection.
pub trait Rule {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn severity(&self) -> Severity;
    fn category(&self) -> RuleCategory;
    fn evaluate(&self, connection: &ConnectionData, ctx: &RuleContext<'_>) -> RuleOutcome;

    /// Issue pre-filled with this rule's id, severity and category.
    fn issue(&self, message: String) -> ValidationIssue {
        ValidationIssue::new(self.id(), self.severity(), self.category(), message)
    }
}

/// Serializable description of a registered rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub category: RuleCategory,
}

impl RuleInfo {
    pub fn of(rule: &dyn Rule) -> Self {
        Self {
            id: rule.id().to_string(),
            name: rule.name().to_string(),
            severity: rule.severity(),
            category: rule.category(),
        }
    }
}

type Evaluator = Box<dyn Fn(&ConnectionData, &RuleContext<'_>) -> RuleOutcome>;

/// Rule backed by a caller-supplied closure.
pub struct FnRule {
    id: String,
    name: String,
    severity: Severity,
    category: RuleCategory,
    evaluate: Evaluator,
}

impl FnRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        category: RuleCategory,
        evaluate: impl Fn(&ConnectionData, &RuleContext<'_>) -> RuleOutcome + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            severity,
            category,
            evaluate: Box::new(evaluate),
        }
    }
}

impl Rule for FnRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        self.category
    }

    fn evaluate(&self, connection: &ConnectionData, ctx: &RuleContext<'_>) -> RuleOutcome {
        (self.evaluate)(connection, ctx)
    }
}

/// Rules registered by a fresh validator, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(NoSelfConnection),
        Box::new(DirectionMismatch),
        Box::new(NodeTypeCompatibility),
        Box::new(ProcessFlowDirection),
        Box::new(RequiredProperties),
    ]
}

pub struct NoSelfConnection;

impl Rule for NoSelfConnection {
    fn id(&self) -> &str {
        NO_SELF_CONNECTION
    }

    fn name(&self) -> &str {
        "No self connection"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Topology
    }

    fn evaluate(&self, connection: &ConnectionData, _ctx: &RuleContext<'_>) -> RuleOutcome {
        if connection.source.node_id != connection.target.node_id {
            return RuleOutcome::pass();
        }
        let issue = self
            .issue("Node cannot connect to itself".to_string())
            .affecting([connection.id.clone(), connection.source.node_id.clone()])
            .with_fixes(["Select a different target node"]);
        RuleOutcome::fail(vec![issue], 0.0)
    }
}

/// Prefers connection points that face each other. Never blocks.
pub struct DirectionMismatch;

impl Rule for DirectionMismatch {
    fn id(&self) -> &str {
        DIRECTION_MISMATCH
    }

    fn name(&self) -> &str {
        "Connection direction mismatch"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Layout
    }

    fn evaluate(&self, connection: &ConnectionData, _ctx: &RuleContext<'_>) -> RuleOutcome {
        let (Some(src), Some(dst)) = (
            &connection.source.connection_point,
            &connection.target.connection_point,
        ) else {
            return RuleOutcome::pass();
        };
        if src.direction.opposite() == dst.direction {
            RuleOutcome::pass()
        } else {
            RuleOutcome::pass_with(
                85.0,
                vec!["Use connection points with opposing directions for a cleaner route".to_string()],
            )
        }
    }
}

pub struct NodeTypeCompatibility;

impl Rule for NodeTypeCompatibility {
    fn id(&self) -> &str {
        NODE_TYPE_COMPATIBILITY
    }

    fn name(&self) -> &str {
        "Node type compatibility"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Compatibility
    }

    fn evaluate(&self, connection: &ConnectionData, ctx: &RuleContext<'_>) -> RuleOutcome {
        let src = connection.source.node_type.as_str();
        let dst = connection.target.node_type.as_str();
        let affected = [
            connection.source.node_id.clone(),
            connection.target.node_id.clone(),
        ];

        let Some(entry) = ctx.compatibility.get(src, dst) else {
            let issue = self
                .issue(format!("No compatibility rule defined for {src} -> {dst}"))
                .affecting(affected);
            return RuleOutcome::fail(vec![issue], 0.0);
        };

        if entry.allowed {
            return RuleOutcome::pass().suggesting(entry.warnings.iter().cloned());
        }

        let issue = self
            .issue(format!("{src} cannot be connected to {dst}"))
            .affecting(affected)
            .with_fixes(entry.restrictions.iter().cloned());
        RuleOutcome::fail(vec![issue], 0.0).suggesting(entry.warnings.iter().cloned())
    }
}

/// Process lines should run from a flow source into a flow target. Never blocks.
pub struct ProcessFlowDirection;

impl Rule for ProcessFlowDirection {
    fn id(&self) -> &str {
        PROCESS_FLOW_DIRECTION
    }

    fn name(&self) -> &str {
        "Process flow direction"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Process
    }

    fn evaluate(&self, connection: &ConnectionData, _ctx: &RuleContext<'_>) -> RuleOutcome {
        if connection.property_str("lineType") != Some("process") {
            return RuleOutcome::pass();
        }
        let src_ok = FLOW_SOURCES.contains(&connection.source.node_type.as_str());
        let dst_ok = FLOW_TARGETS.contains(&connection.target.node_type.as_str());
        if src_ok && dst_ok {
            RuleOutcome::pass()
        } else {
            RuleOutcome::pass_with(
                90.0,
                vec![format!(
                    "Process flow usually runs from {} into {}",
                    FLOW_SOURCES.join("/"),
                    FLOW_TARGETS.join("/")
                )],
            )
        }
    }
}

/// Every property the connection type requires must be present.
pub struct RequiredProperties;

impl Rule for RequiredProperties {
    fn id(&self) -> &str {
        REQUIRED_PROPERTIES
    }

    fn name(&self) -> &str {
        "Required properties"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Properties
    }

    fn evaluate(&self, connection: &ConnectionData, ctx: &RuleContext<'_>) -> RuleOutcome {
        // registry entry wins over the copy embedded in the connection
        let connection_type = ctx
            .connection_types
            .get(&connection.connection_type.name)
            .unwrap_or(&connection.connection_type);

        let issues: Vec<ValidationIssue> = connection_type
            .required_properties
            .iter()
            .filter(|key| !connection.properties.contains_key(key.as_str()))
            .map(|key| {
                self.issue(format!("Missing required property: {key}"))
                    .affecting([connection.id.clone()])
                    .with_fixes([format!("Set '{key}' on the connection")])
            })
            .collect();

        if issues.is_empty() {
            return RuleOutcome::pass();
        }
        let score = (100.0 - 20.0 * issues.len() as f64).max(60.0);
        RuleOutcome::fail(issues, score)
    }
}

/// Opt-in: node types must match the connection type's allowed endpoints.
pub struct ConnectionTypeEndpoints;

impl Rule for ConnectionTypeEndpoints {
    fn id(&self) -> &str {
        CONNECTION_TYPE_ENDPOINTS
    }

    fn name(&self) -> &str {
        "Connection type endpoints"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Compatibility
    }

    fn evaluate(&self, connection: &ConnectionData, ctx: &RuleContext<'_>) -> RuleOutcome {
        let ct = ctx
            .connection_types
            .get(&connection.connection_type.name)
            .unwrap_or(&connection.connection_type);
        let permits = |allowed: &[String], node_type: &str| {
            allowed.is_empty() || allowed.iter().any(|a| a == node_type)
        };

        let mut issues = Vec::new();
        if !permits(&ct.allowed_sources, &connection.source.node_type) {
            issues.push(
                self.issue(format!(
                    "{} lines cannot start at {}",
                    ct.name, connection.source.node_type
                ))
                .affecting([connection.source.node_id.clone()]),
            );
        }
        if !permits(&ct.allowed_targets, &connection.target.node_type) {
            issues.push(
                self.issue(format!(
                    "{} lines cannot end at {}",
                    ct.name, connection.target.node_type
                ))
                .affecting([connection.target.node_id.clone()]),
            );
        }

        if issues.is_empty() {
            RuleOutcome::pass()
        } else {
            RuleOutcome::fail(issues, 50.0).suggesting(ct.restrictions.iter().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::registry::{ConnectionPoint, Direction, PointRole};
    use crate::validation::types::{ConnectionEnd, ConnectionType};
    use rstest::rstest;

    fn ctx_parts() -> (CompatibilityMatrix, ConnectionTypeRegistry) {
        (CompatibilityMatrix::builtin(), ConnectionTypeRegistry::builtin())
    }

    fn connection(src_type: &str, dst_type: &str) -> ConnectionData {
        ConnectionData::new(
            "c1",
            ConnectionEnd::new("n1", src_type),
            ConnectionEnd::new("n2", dst_type),
            ConnectionType::named("process"),
        )
    }

    fn point(direction: Direction) -> ConnectionPoint {
        ConnectionPoint::new("p", "n", Point::new(0.0, 0.0), direction, PointRole::Bidirectional)
    }

    #[test]
    fn test_self_connection() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let mut c = connection("pump", "vessel");
        assert!(NoSelfConnection.evaluate(&c, &ctx).valid);
        c.target.node_id = "n1".into();
        let out = NoSelfConnection.evaluate(&c, &ctx);
        assert!(!out.valid);
        assert_eq!(out.issues[0].rule_id, NO_SELF_CONNECTION);
        assert!(out.issues[0].message.contains("cannot connect to itself"));
    }

    #[rstest]
    #[case(Direction::East, Direction::West, 100.0)]
    #[case(Direction::North, Direction::South, 100.0)]
    #[case(Direction::East, Direction::East, 85.0)]
    #[case(Direction::North, Direction::West, 85.0)]
    fn test_direction_scores(#[case] a: Direction, #[case] b: Direction, #[case] score: f64) {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let mut c = connection("pump", "vessel");
        c.source = c.source.at(point(a));
        c.target = c.target.at(point(b));
        let out = DirectionMismatch.evaluate(&c, &ctx);
        assert!(out.valid);
        assert_eq!(out.score, score);
        assert_eq!(out.suggestions.is_empty(), score == 100.0);
    }

    #[test]
    fn test_compatibility_outcomes() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        assert!(NodeTypeCompatibility.evaluate(&connection("pump", "vessel"), &ctx).valid);

        let forbidden = NodeTypeCompatibility.evaluate(&connection("pump", "pump"), &ctx);
        assert!(!forbidden.valid);
        assert!(!forbidden.issues[0].suggested_fixes.is_empty());

        let unknown = NodeTypeCompatibility.evaluate(&connection("pump", "reactor"), &ctx);
        assert!(!unknown.valid);

        let warned = NodeTypeCompatibility.evaluate(&connection("sensor", "controller"), &ctx);
        assert!(warned.valid);
        assert_eq!(warned.suggestions.len(), 1);
    }

    #[test]
    fn test_process_flow_only_for_process_lines() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let plain = connection("valve", "pump");
        assert_eq!(ProcessFlowDirection.evaluate(&plain, &ctx).score, 100.0);

        let process = connection("valve", "pump").with_property("lineType", "process");
        let out = ProcessFlowDirection.evaluate(&process, &ctx);
        assert!(out.valid);
        assert_eq!(out.score, 90.0);

        let good = connection("pump", "tank").with_property("lineType", "process");
        assert_eq!(ProcessFlowDirection.evaluate(&good, &ctx).score, 100.0);
    }

    #[test]
    fn test_required_properties_floor() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let out = RequiredProperties.evaluate(&connection("pump", "vessel"), &ctx);
        assert!(!out.valid);
        assert_eq!(out.issues.len(), 3);
        assert_eq!(out.score, 60.0);
        assert!(out.issues.iter().all(|i| i.message.starts_with("Missing required property")));

        let one_missing = connection("pump", "vessel")
            .with_property("lineType", "process")
            .with_property("fluid", "water");
        let out = RequiredProperties.evaluate(&one_missing, &ctx);
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.score, 80.0);
    }

    #[test]
    fn test_required_properties_falls_back_to_embedded_type() {
        let m = CompatibilityMatrix::empty();
        let t = ConnectionTypeRegistry::empty();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let mut c = connection("pump", "vessel");
        c.connection_type.required_properties = vec!["tag".into()];
        let out = RequiredProperties.evaluate(&c, &ctx);
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_connection_type_endpoints() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        assert!(ConnectionTypeEndpoints.evaluate(&connection("pump", "vessel"), &ctx).valid);
        let out = ConnectionTypeEndpoints.evaluate(&connection("sensor", "vessel"), &ctx);
        assert!(!out.valid);
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_fn_rule() {
        let (m, t) = ctx_parts();
        let ctx = RuleContext { compatibility: &m, connection_types: &t };
        let rule = FnRule::new("has-id", "Has id", Severity::Info, RuleCategory::Custom, |c, _| {
            if c.id.is_empty() { RuleOutcome::fail(Vec::new(), 0.0) } else { RuleOutcome::pass() }
        });
        assert_eq!(RuleInfo::of(&rule).id, "has-id");
        assert!(rule.evaluate(&connection("a", "b"), &ctx).valid);
    }
}
