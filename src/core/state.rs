use super::conversation::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// States of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    /// Send the full history to the tool-bound model
    AwaitingModel,
    /// Execute the tool calls of the latest reply
    ToolCall,
    /// Ask the model for the structured answer
    Respond,
    Done,
}

impl AgentState {
    pub fn initial() -> Self {
        AgentState::AwaitingModel
    }

    pub fn is_terminal(self) -> bool {
        self == AgentState::Done
    }

    /// Edge out of `AwaitingModel` once the model reply has been appended
    pub fn after_model_reply(reply: &Message) -> Self {
        if reply.tool_calls().is_empty() {
            AgentState::Respond
        } else {
            AgentState::ToolCall
        }
    }

    /// Fixed successor of the non-branching states
    pub fn next(self) -> Self {
        match self {
            AgentState::ToolCall => AgentState::AwaitingModel,
            AgentState::Respond | AgentState::Done => AgentState::Done,
            // `AwaitingModel` branches on the reply, see `after_model_reply`
            AgentState::AwaitingModel => AgentState::AwaitingModel,
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::AwaitingModel => "AWAITING_MODEL",
            AgentState::ToolCall => "TOOL_CALL",
            AgentState::Respond => "RESPOND",
            AgentState::Done => "DONE",
        };
        f.write_str(name)
    }
}
