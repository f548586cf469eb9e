use schemars::{schema::RootSchema, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    any::{type_name, TypeId},
    sync::Arc,
};

/// Cached JSON schema handle associated with a response type.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema<T: 'static>(schema_name: &'static str, root: RootSchema) -> Self {
        let type_name = type_name::<T>();
        let schema_json = serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("failed to serialize schema for {}: {}", type_name, err));

        Self {
            schema_name,
            type_name,
            type_id: TypeId::of::<T>(),
            schema_json: Arc::new(schema_json),
        }
    }

    /// Generate the schema of `T` with `schemars`; doc comments become descriptions.
    pub fn for_type<T: JsonSchema + 'static>(schema_name: &'static str) -> Self {
        Self::from_root_schema::<T>(schema_name, schemars::schema_for!(T))
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.schema_json.get("description").and_then(Value::as_str)
    }
}

/// A type the agent can be asked to produce as its final structured answer.
pub trait CompletionSchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}
