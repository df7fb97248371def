pub mod geometry;
pub mod registry;
pub mod routing;
pub mod scene;
pub mod validation;

use wasm_bindgen::prelude::*;

use registry::{ConnectionPoint, Obstacle};
use routing::{ConnectionRouter, RouteOptions};
use scene::{RouteRequest, run_scene};
use validation::{ConnectionData, ConnectionValidator};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Route and validate a whole scene given as JSON
#[wasm_bindgen(js_name = "routeScene")]
pub fn route_scene(scene: &str, pretty: Option<bool>) -> Result<String, String> {
    let report = run_scene(scene).map_err(|e| e.to_string())?;
    report
        .to_json(pretty.unwrap_or(false))
        .map_err(|e| e.to_string())
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(js_error)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

/// Stateful router and validator for one open diagram.
#[wasm_bindgen(js_name = "ConnectionRouter")]
pub struct WasmRouter {
    router: ConnectionRouter,
    validator: ConnectionValidator,
}

#[wasm_bindgen(js_class = "ConnectionRouter")]
impl WasmRouter {
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<WasmRouter, JsValue> {
        let options: RouteOptions = match options {
            Some(json) => parse(&json)?,
            None => RouteOptions::default(),
        };
        Ok(Self {
            router: ConnectionRouter::with_options(options),
            validator: ConnectionValidator::new(),
        })
    }

    #[wasm_bindgen(js_name = "setOptions")]
    pub fn set_options(&mut self, options: &str) -> Result<(), JsValue> {
        self.router.set_options(parse(options)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = "registerObstacle")]
    pub fn register_obstacle(&mut self, obstacle: &str) -> Result<(), JsValue> {
        self.router.register_obstacle(parse::<Obstacle>(obstacle)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = "removeObstacle")]
    pub fn remove_obstacle(&mut self, id: &str) -> bool {
        self.router.remove_obstacle(id).is_some()
    }

    #[wasm_bindgen(js_name = "registerConnectionPoint")]
    pub fn register_connection_point(&mut self, point: &str) -> Result<(), JsValue> {
        self.router
            .register_connection_point(parse::<ConnectionPoint>(point)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = "removeConnectionPoint")]
    pub fn remove_connection_point(&mut self, id: &str) -> bool {
        self.router.remove_connection_point(id).is_some()
    }

    #[wasm_bindgen(js_name = "setOccupied")]
    pub fn set_occupied(&mut self, id: &str, occupied: bool) -> bool {
        self.router.registry_mut().set_occupied(id, occupied)
    }

    #[wasm_bindgen(js_name = "availableConnectionPoints")]
    pub fn available_connection_points(&self, node_id: &str) -> Result<String, JsValue> {
        to_json(&self.router.available_connection_points(node_id))
    }

    pub fn clear(&mut self) {
        self.router.clear();
    }

    #[wasm_bindgen(js_name = "getObstacles")]
    pub fn obstacles(&self) -> Result<String, JsValue> {
        to_json(&self.router.obstacles())
    }

    #[wasm_bindgen(js_name = "getConnectionPoints")]
    pub fn connection_points(&self) -> Result<String, JsValue> {
        to_json(&self.router.connection_points())
    }

    /// JSON pair, or `null` when the nodes cannot be joined.
    #[wasm_bindgen(js_name = "findOptimalConnectionPoints")]
    pub fn find_optimal_connection_points(
        &self,
        source_node_id: &str,
        target_node_id: &str,
    ) -> Result<String, JsValue> {
        to_json(
            &self
                .router
                .find_optimal_connection_points(source_node_id, target_node_id),
        )
    }

    /// Route a request (`{from,to}`, point ids or node ids); smoothed and checked.
    /// Does not mark points occupied; call `setOccupied` on commit.
    #[wasm_bindgen(js_name = "routeConnection")]
    pub fn route_connection(&self, request: &str) -> Result<String, JsValue> {
        let request: RouteRequest = parse(request)?;
        let report = scene::route_request(&self.router, &request).map_err(js_error)?;
        to_json(&report)
    }

    /// Raw route between two connection point objects, without smoothing.
    #[wasm_bindgen(js_name = "routeConnectionPoints")]
    pub fn route_connection_points(
        &self,
        source: &str,
        target: &str,
        options: Option<String>,
    ) -> Result<String, JsValue> {
        let source: ConnectionPoint = parse(source)?;
        let target: ConnectionPoint = parse(target)?;
        let options = self.options_or_default(options)?;
        let result = self
            .router
            .route_connection_points_with(&source, &target, &options)
            .map_err(js_error)?;
        to_json(&result)
    }

    #[wasm_bindgen(js_name = "optimizePath")]
    pub fn optimize_path(&self, path: &str, options: Option<String>) -> Result<String, JsValue> {
        let path: Vec<geometry::Point> = parse(path)?;
        let options = self.options_or_default(options)?;
        to_json(&self.router.optimize_path_with(&path, &options))
    }

    #[wasm_bindgen(js_name = "validatePath")]
    pub fn validate_path(&self, path: &str) -> Result<String, JsValue> {
        let path: Vec<geometry::Point> = parse(path)?;
        let report = self.router.validate_path(&path).map_err(js_error)?;
        to_json(&report)
    }

    #[wasm_bindgen(js_name = "validateConnection")]
    pub fn validate_connection(&self, connection: &str) -> Result<String, JsValue> {
        let connection: ConnectionData = parse(connection)?;
        to_json(&self.validator.validate_connection(&connection))
    }

    #[wasm_bindgen(js_name = "validateConnections")]
    pub fn validate_connections(&self, connections: &str) -> Result<String, JsValue> {
        let connections: Vec<ConnectionData> = parse(connections)?;
        to_json(&self.validator.validate_connections(&connections))
    }

    #[wasm_bindgen(js_name = "areNodesCompatible")]
    pub fn are_nodes_compatible(&self, source_type: &str, target_type: &str) -> bool {
        self.validator.are_nodes_compatible(source_type, target_type)
    }

    #[wasm_bindgen(js_name = "getSuggestedProperties")]
    pub fn suggested_properties(
        &self,
        source_type: &str,
        target_type: &str,
        connection_type: &str,
    ) -> Result<String, JsValue> {
        to_json(
            &self
                .validator
                .suggested_properties(source_type, target_type, connection_type),
        )
    }

    #[wasm_bindgen(js_name = "listRules")]
    pub fn list_rules(&self) -> Result<String, JsValue> {
        to_json(&self.validator.rule_infos())
    }

    #[wasm_bindgen(js_name = "removeRule")]
    pub fn remove_rule(&mut self, id: &str) -> bool {
        self.validator.remove_rule(id)
    }
}

impl WasmRouter {
    fn options_or_default(&self, options: Option<String>) -> Result<RouteOptions, JsValue> {
        match options {
            Some(json) => parse(&json),
            None => Ok(self.router.options().clone()),
        }
    }
}
