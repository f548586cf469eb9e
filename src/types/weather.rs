use crate::schemas::{CompletionSchema, SchemaHandle};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Response to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherResponse {
    /// The temperature in fahrenheit
    pub temperature: f64,
    /// The direction of wind in abbreviated form
    pub wind_direction: String,
    /// The speed of the wind in km/h
    pub wind_speed: f64,
}

impl CompletionSchema for WeatherResponse {
    fn schema() -> &'static SchemaHandle {
        static HANDLE: OnceLock<SchemaHandle> = OnceLock::new();
        HANDLE.get_or_init(|| SchemaHandle::for_type::<Self>("WeatherResponse"))
    }
}
