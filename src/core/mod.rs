pub mod agent;
pub mod conversation;
pub mod model;
pub mod state;
pub mod tool_call;

pub use agent::Agent;
pub use conversation::{Conversation, Message};
pub use model::ChatModel;
pub use state::AgentState;
pub use tool_call::{ToolCall, ToolExecution, ToolOutput};
