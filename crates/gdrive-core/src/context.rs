use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Per-execution context made available to dynamic expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowContext {
    pub execution_id: Uuid,
    #[serde(default)]
    pub variables: Map<String, JsonValue>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            variables: Map::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.variables.get(key)
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}
