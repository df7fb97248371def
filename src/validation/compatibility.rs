//! Directed node-type compatibility table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Verdict for one ordered `(source, target)` node-type pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compatibility {
    pub allowed: bool,
    pub restrictions: Vec<String>,
    pub warnings: Vec<String>,
}

impl Compatibility {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            ..Self::default()
        }
    }

    pub fn forbidden() -> Self {
        Self::default()
    }

    pub fn restricted(mut self, restriction: impl Into<String>) -> Self {
        self.restrictions.push(restriction.into());
        self
    }

    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Asymmetric `source -> target -> Compatibility` lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityMatrix {
    entries: HashMap<String, HashMap<String, Compatibility>>,
}

impl CompatibilityMatrix {
    /// Empty matrix; every pair is unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Matrix seeded with the equipment and instrument graphs.
    pub fn builtin() -> Self {
        let mut m = Self::empty();

        // process equipment
        for (src, dst) in [
            ("pump", "vessel"),
            ("pump", "tank"),
            ("pump", "valve"),
            ("pump", "heat-exchanger"),
            ("vessel", "pump"),
            ("vessel", "valve"),
            ("vessel", "heat-exchanger"),
            ("tank", "pump"),
            ("tank", "valve"),
            ("valve", "pump"),
            ("valve", "vessel"),
            ("valve", "tank"),
            ("valve", "valve"),
            ("valve", "heat-exchanger"),
            ("heat-exchanger", "vessel"),
            ("heat-exchanger", "tank"),
            ("heat-exchanger", "valve"),
        ] {
            m.set(src, dst, Compatibility::allowed());
        }
        m.set(
            "pump",
            "pump",
            Compatibility::forbidden()
                .restricted("Pumps in series need an isolation valve between them"),
        );
        m.set(
            "tank",
            "tank",
            Compatibility::allowed().warning("Tank-to-tank transfer usually needs a pump"),
        );
        m.set(
            "vessel",
            "tank",
            Compatibility::allowed().warning("Check the pressure rating of the receiving tank"),
        );
        m.set(
            "heat-exchanger",
            "pump",
            Compatibility::allowed()
                .warning("Hot fluid at pump suction can cause cavitation"),
        );

        // instrumentation
        for (src, dst) in [
            ("sensor", "transmitter"),
            ("transmitter", "controller"),
            ("controller", "valve"),
            ("controller", "controller"),
            ("vessel", "sensor"),
            ("tank", "sensor"),
            ("pump", "sensor"),
            ("heat-exchanger", "sensor"),
        ] {
            m.set(src, dst, Compatibility::allowed());
        }
        m.set(
            "sensor",
            "controller",
            Compatibility::allowed()
                .warning("Sensor-to-controller links normally go through a transmitter"),
        );
        m.set(
            "transmitter",
            "valve",
            Compatibility::forbidden().restricted("Valves must be driven by a controller"),
        );
        m.set(
            "sensor",
            "valve",
            Compatibility::forbidden().restricted("Valves must be driven by a controller"),
        );

        m
    }

    /// Insert or replace the entry for `source -> target`.
    pub fn set(&mut self, source: impl Into<String>, target: impl Into<String>, rule: Compatibility) {
        self.entries
            .entry(source.into())
            .or_default()
            .insert(target.into(), rule);
    }

    pub fn remove(&mut self, source: &str, target: &str) -> Option<Compatibility> {
        let targets = self.entries.get_mut(source)?;
        let removed = targets.remove(target);
        if targets.is_empty() {
            self.entries.remove(source);
        }
        removed
    }

    pub fn get(&self, source: &str, target: &str) -> Option<&Compatibility> {
        self.entries.get(source)?.get(target)
    }

    /// Known and allowed.
    pub fn is_allowed(&self, source: &str, target: &str) -> bool {
        self.get(source, target).is_some_and(|c| c.allowed)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
