pub mod response;
pub mod result;
pub mod weather;

pub use response::deserialize_structured_response;
pub use result::{RunResult, TokenUsage};
pub use weather::WeatherResponse;
