//! Tool abstractions and the mock weather tool

pub mod tool;
pub mod weather;

pub use tool::{Tool, ToolRegistry};
pub use weather::{get_weather, City, GetWeatherTool, WeatherParams};
