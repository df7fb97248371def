//! Catalog of connection types and the properties each one requires.

use serde_json::{Value, json};
use std::collections::HashMap;

use super::types::{ConnectionType, Properties};

const EQUIPMENT: [&str; 5] = ["pump", "vessel", "tank", "valve", "heat-exchanger"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionTypeRegistry {
    types: HashMap<String, ConnectionType>,
}

impl ConnectionTypeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Process, signal, pneumatic and utility lines.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.add(build(
            "process",
            &EQUIPMENT,
            &EQUIPMENT,
            &["lineType", "fluid", "pipeSize"],
            json!({"lineType": "process", "pipeSize": "2in", "material": "carbon-steel"}),
        ));
        reg.add(build(
            "signal",
            &["sensor", "transmitter", "controller"],
            &["transmitter", "controller", "valve"],
            &["lineType", "signalType"],
            json!({"lineType": "signal", "signalType": "4-20mA"}),
        ));
        reg.add(build(
            "pneumatic",
            &["controller"],
            &["valve"],
            &["lineType", "pressure"],
            json!({"lineType": "pneumatic", "pressure": "3-15psi"}),
        ));
        reg.add(build(
            "utility",
            &EQUIPMENT,
            &EQUIPMENT,
            &["lineType", "service"],
            json!({"lineType": "utility"}),
        ));
        reg
    }

    /// Insert or replace by name.
    pub fn add(&mut self, connection_type: ConnectionType) {
        self.types.insert(connection_type.name.clone(), connection_type);
    }

    pub fn remove(&mut self, name: &str) -> Option<ConnectionType> {
        self.types.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionType> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

fn build(
    name: &str,
    sources: &[&str],
    targets: &[&str],
    required: &[&str],
    defaults: Value,
) -> ConnectionType {
    let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    ConnectionType {
        name: name.to_string(),
        allowed_sources: to_vec(sources),
        allowed_targets: to_vec(targets),
        required_properties: to_vec(required),
        restrictions: Vec::new(),
        default_properties: match defaults {
            Value::Object(map) => map,
            _ => Properties::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types() {
        let reg = ConnectionTypeRegistry::builtin();
        let process = reg.get("process").unwrap();
        assert!(process.required_properties.contains(&"fluid".to_string()));
        assert_eq!(process.default_properties["pipeSize"], "2in");
        assert!(reg.get("signal").is_some());
        assert_eq!(reg.names().count(), 4);
    }

    #[test]
    fn test_add_replaces_and_remove() {
        let mut reg = ConnectionTypeRegistry::empty();
        reg.add(ConnectionType::named("steam"));
        let mut steam = ConnectionType::named("steam");
        steam.required_properties.push("pressure".into());
        reg.add(steam);
        assert_eq!(reg.get("steam").unwrap().required_properties.len(), 1);
        assert!(reg.remove("steam").is_some());
        assert!(reg.get("steam").is_none());
    }
}
