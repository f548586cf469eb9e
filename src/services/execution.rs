use super::{
    openai_client::ChatCompletionRequest,
    response_parser::{accumulate_usage, parse_assistant_reply},
    structured::{coerce_structured_response, extract_structured_payload, structured_request},
};
use crate::{
    core::{
        agent::Agent,
        conversation::{Conversation, Message},
        state::AgentState,
        tool_call::ToolExecution,
    },
    error::{AgentError, Result},
    schemas::CompletionSchema,
    types::{
        result::{RunResult, TokenUsage},
        WeatherResponse,
    },
};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, info};

impl Agent {
    /// Run the weather query and return the structured weather answer
    pub async fn run(&self, prompt: &str) -> Result<RunResult<WeatherResponse>> {
        self.invoke::<WeatherResponse>(prompt).await
    }

    /// Run a single user prompt to a structured answer of type `T`
    pub async fn invoke<T: CompletionSchema>(&self, prompt: &str) -> Result<RunResult<T>> {
        self.invoke_with_messages(vec![Message::user(prompt)]).await
    }

    /// Drive the control loop from an initial history until the structured answer
    pub async fn invoke_with_messages<T: CompletionSchema>(
        &self,
        messages: Vec<Message>,
    ) -> Result<RunResult<T>> {
        if messages.is_empty() {
            return Err(AgentError::ConversationState(
                "a run needs at least one message".to_string(),
            ));
        }

        let start_time = Instant::now();
        let mut conversation = Conversation::with_messages(messages);
        let mut state = AgentState::initial();
        let mut iterations = 0;
        let mut usage: Option<TokenUsage> = None;
        let mut answer: Option<(T, Value)> = None;

        while !state.is_terminal() {
            debug!(target: "weather_agent::agent", state = %state, iteration = iterations);

            state = match state {
                AgentState::AwaitingModel => {
                    if iterations >= self.config().max_iterations {
                        return Err(AgentError::MaxIterations(self.config().max_iterations));
                    }
                    iterations += 1;

                    let reply = self.call_model(&conversation, &mut usage).await?;
                    let next = AgentState::after_model_reply(&reply);
                    conversation.push(reply);
                    next
                }
                AgentState::ToolCall => {
                    self.execute_tool_calls(&mut conversation).await?;
                    state.next()
                }
                AgentState::Respond => {
                    answer = Some(self.respond::<T>(&conversation, &mut usage).await?);
                    state.next()
                }
                AgentState::Done => AgentState::Done,
            };
        }

        let (final_response, structured) = answer.ok_or_else(|| {
            AgentError::ConversationState("run ended without a structured answer".to_string())
        })?;

        info!(
            target: "weather_agent::agent",
            iterations,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "run complete"
        );

        Ok(RunResult {
            messages: conversation.into_messages(),
            final_response,
            structured,
            tokens: usage,
            duration: start_time.elapsed(),
            iterations,
        })
    }

    /// One tool-bound call with the full history
    async fn call_model(
        &self,
        conversation: &Conversation,
        usage: &mut Option<TokenUsage>,
    ) -> Result<Message> {
        let mut request =
            ChatCompletionRequest::new(self.config().model.clone(), conversation.to_openai_messages())
                .with_config(self.config());

        if !self.tools().is_empty() {
            request = request
                .with_tools(self.tools().to_openai_tools())
                .with_tool_choice(json!("auto"));
        }

        let response = self
            .chat_model()
            .chat_completion(&request.into_value())
            .await?;
        accumulate_usage(usage, &response);

        parse_assistant_reply(&response)
    }

    /// Execute every pending tool call in order, appending one result each.
    /// Any tool failure ends the run.
    async fn execute_tool_calls(&self, conversation: &mut Conversation) -> Result<()> {
        let calls = conversation.pending_tool_calls().to_vec();

        for call in &calls {
            let execution = ToolExecution::start(call);
            let output = match self.tools().execute(&call.name, call.arguments.clone()).await {
                Ok(output) => execution.complete(output),
                Err(err) => {
                    error!(
                        target: "weather_agent::agent",
                        tool = %call.name,
                        code = err.error_code(),
                        "tool call failed: {}",
                        err
                    );
                    return Err(err);
                }
            };

            debug!(
                target: "weather_agent::agent",
                tool = %output.tool_name,
                duration_ms = ?output.duration_ms,
                "tool call complete"
            );
            conversation.push(Message::tool(
                output.tool_call_id.clone(),
                output.tool_name.clone(),
                output.as_string(),
            ));
        }

        Ok(())
    }

    /// Final call constrained to the schema of `T`
    async fn respond<T: CompletionSchema>(
        &self,
        conversation: &Conversation,
        usage: &mut Option<TokenUsage>,
    ) -> Result<(T, Value)> {
        let schema = T::schema();
        let source = conversation.respond_source()?;
        let request = structured_request(self.config(), schema, source);

        let response = self.chat_model().chat_completion(&request).await?;
        accumulate_usage(usage, &response);

        let payload =
            extract_structured_payload(&response, schema, self.config().structured_method)?;
        let typed = coerce_structured_response::<T>(&payload)?;
        Ok((typed, payload))
    }
}
