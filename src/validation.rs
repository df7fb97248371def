//! Rule-based connection validation with weighted scoring.

pub mod compatibility;
pub mod connection_types;
pub mod engine;
pub mod rules;
pub mod types;

pub use compatibility::{Compatibility, CompatibilityMatrix};
pub use connection_types::ConnectionTypeRegistry;
pub use engine::ConnectionValidator;
pub use rules::{FnRule, Rule, RuleContext, RuleInfo};
pub use types::{
    BatchSummary, ConnectionData, ConnectionEnd, ConnectionType, Properties, RuleCategory,
    RuleOutcome, Severity, ValidationIssue, ValidationReport,
};
