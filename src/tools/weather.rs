use super::Tool;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

const NYC_WEATHER: &str =
    "It is cloudy in NYC, with 5 mph winds in the North-East direction and a temperature of 70 degrees";
const SF_WEATHER: &str =
    "It is 75 degrees and sunny in SF, with 3 mph in the South-East direction";

/// Cities the weather tool knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Nyc,
    Sf,
}

impl City {
    pub fn as_str(self) -> &'static str {
        match self {
            City::Nyc => "nyc",
            City::Sf => "sf",
        }
    }
}

impl FromStr for City {
    type Err = AgentError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "nyc" => Ok(City::Nyc),
            "sf" => Ok(City::Sf),
            other => Err(AgentError::UnknownCity(other.to_string())),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for weather queries
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WeatherParams {
    pub city: City,
}

/// Canned weather report for a city
pub fn get_weather(city: City) -> &'static str {
    match city {
        City::Nyc => NYC_WEATHER,
        City::Sf => SF_WEATHER,
    }
}

/// Mock weather lookup over a fixed set of cities
#[derive(Debug, Default)]
pub struct GetWeatherTool;

impl GetWeatherTool {
    pub fn new() -> Self {
        Self
    }

    /// Read `city` out of the call arguments. Anything outside the known set
    /// is fatal for the run.
    fn city_from_arguments(parameters: &Value) -> Result<City> {
        match parameters.get("city") {
            Some(Value::String(city)) => city.parse(),
            Some(other) => Err(AgentError::InvalidFunctionCall(format!(
                "get_weather expects `city` to be a string, got {other}"
            ))),
            None => Err(AgentError::InvalidFunctionCall(
                "get_weather requires a `city` argument".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Use this to get weather information"
    }

    fn parameters_schema(&self) -> Value {
        let schema = schemars::schema_for!(WeatherParams);
        let mut parameters = serde_json::to_value(&schema.schema).unwrap_or_else(|_| {
            serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            })
        });

        // Inline the enum so the model sees the allowed values directly.
        parameters["properties"]["city"] = serde_json::json!({
            "type": "string",
            "enum": [City::Nyc.as_str(), City::Sf.as_str()]
        });
        if let Some(obj) = parameters.as_object_mut() {
            obj.remove("definitions");
            obj.remove("title");
        }
        parameters
    }

    async fn execute(&self, parameters: Value) -> Result<Value> {
        let city = Self::city_from_arguments(&parameters)?;
        Ok(Value::String(get_weather(city).to_string()))
    }
}
