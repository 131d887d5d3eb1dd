//! Tool descriptors and argument validation.
//!
//! A [`ToolDescriptor`] pairs the JSON Schema derived from a tool's parameter
//! struct with the ordered list of parameters checked on every invocation
//! before the handler is reached.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use super::error::ToolError;

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Float,
}

impl ParamType {
    /// JSON Schema type name.
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Float => "number",
        }
    }

    /// Whether `value` is acceptable for this type. Integers are valid floats.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Float => value.is_number(),
        }
    }
}

/// One required parameter, in the order it is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamType) -> Self {
        Self { name, kind }
    }
}

/// Declared name, description, schema and ordered parameters of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<JsonObject>,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    /// Descriptor whose input schema is derived from `P`.
    pub fn new<P: JsonSchema + 'static>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            input_schema: schema_for_type::<P>().into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Listing entry as sent in `tools/list`.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.as_ref(),
        })
    }

    /// rmcp Tool model for the stdio transport.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: self.input_schema.clone(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Check `arguments` against the declared parameters.
    ///
    /// Returns only the declared parameters; undeclared keys are dropped and
    /// `null` counts as not supplied.
    pub fn validate(&self, arguments: &JsonObject) -> Result<ValidatedArgs, ToolError> {
        let mut validated = JsonObject::new();

        for spec in &self.params {
            match arguments.get(spec.name) {
                None | Some(Value::Null) => {
                    return Err(ToolError::missing_parameter(spec.name));
                }
                Some(value) if spec.kind.accepts(value) => {
                    validated.insert(spec.name.to_string(), value.clone());
                }
                Some(value) => {
                    return Err(ToolError::invalid_parameter(
                        spec.name,
                        format!("expected {}, got {}", spec.kind.json_type(), type_name(value)),
                    ));
                }
            }
        }

        Ok(ValidatedArgs(validated))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments that passed descriptor validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs(JsonObject);

impl ValidatedArgs {
    /// Deserialize into a tool's parameter struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Arguments of a point lookup.
    #[derive(Debug, serde::Deserialize, JsonSchema)]
    struct PointParams {
        /// Latitude
        latitude: f64,
        /// Label
        label: String,
    }

    fn point_lookup() -> ToolDescriptor {
        ToolDescriptor::new::<PointParams>("point_lookup", "Test descriptor")
            .param(ParamSpec::required("latitude", ParamType::Float))
            .param(ParamSpec::required("label", ParamType::String))
    }

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn test_validate_accepts_well_typed_arguments() {
        let validated = point_lookup()
            .validate(&args(json!({ "latitude": 38, "label": "x", "extra": 1 })))
            .unwrap();

        assert_eq!(validated.get("latitude"), Some(&json!(38)));
        assert!(validated.get("extra").is_none());
    }

    #[test]
    fn test_validate_reports_missing_parameter() {
        let err = point_lookup()
            .validate(&args(json!({ "latitude": 1.5 })))
            .unwrap_err();
        assert_eq!(err, ToolError::missing_parameter("label"));
        assert_eq!(err.to_string(), "Missing required parameter 'label'");
    }

    #[test]
    fn test_validate_null_is_missing() {
        let err = point_lookup()
            .validate(&args(json!({ "latitude": null, "label": "x" })))
            .unwrap_err();
        assert_eq!(err, ToolError::missing_parameter("latitude"));
    }

    #[test]
    fn test_validate_reports_wrong_type() {
        let err = point_lookup()
            .validate(&args(json!({ "latitude": "north", "label": "x" })))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for parameter 'latitude': expected number, got string"
        );
    }

    #[test]
    fn test_input_schema_derived_from_params() {
        let descriptor = point_lookup();
        let schema = descriptor.input_schema.as_ref();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["latitude"]["type"], json!("number"));
        assert_eq!(schema["properties"]["label"]["description"], json!("Label"));

        let mut required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        required.sort();
        assert_eq!(required, vec!["label", "latitude"]);
    }

    #[test]
    fn test_parse_into_struct() {
        let validated = point_lookup()
            .validate(&args(json!({ "latitude": 12, "label": "x" })))
            .unwrap();
        let point: PointParams = validated.parse().unwrap();
        assert_eq!(point.latitude, 12.0);
        assert_eq!(point.label, "x");
    }
}
