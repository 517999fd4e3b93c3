//! Function definitions offered to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable function as described to the model
///
/// Name, free-text description and a JSON schema for the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name the model will echo back in its call
    pub name: String,

    /// Tells the model when to pick this function
    pub description: String,

    /// JSON schema for the parameters
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// JSON schema fragments for function parameters
pub mod schema {
    use serde_json::{Value, json};

    /// Object schema with the given properties and required keys
    ///
    /// # Example
    ///
    /// ```
    /// use bullbear_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "ticker": schema::string("Stock ticker symbol"),
    ///         "window": schema::integer("Number of days"),
    ///     }),
    ///     &["ticker", "window"],
    /// );
    /// assert_eq!(schema["required"][1], "window");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// `{"type": "string"}` with a description
    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    /// `{"type": "integer"}` with a description
    pub fn integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_keeps_schema() {
        let params = schema::object(json!({"ticker": schema::string("symbol")}), &["ticker"]);

        let tool = ToolDefinition::new("get_stock_price", "Latest price", params.clone());
        assert_eq!(tool.name, "get_stock_price");
        assert_eq!(tool.parameters, params);
        assert_eq!(tool.parameters["type"], "object");
    }

    #[test]
    fn test_property_schemas() {
        assert_eq!(schema::string("t")["type"], "string");
        assert_eq!(schema::integer("n")["type"], "integer");
        assert_eq!(schema::integer("n")["description"], "n");
    }
}
