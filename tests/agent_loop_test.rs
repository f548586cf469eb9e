use async_trait::async_trait;
use serde_json::{json, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use weather_agent::{
    get_weather, Agent, AgentConfig, AgentError, ChatModel, City, GetWeatherTool, Message,
    StructuredOutputMethod, ToolRegistry,
};

/// Chat model that replays canned responses and records every request
#[derive(Debug, Default)]
struct ScriptedModel {
    responses: Mutex<VecDeque<weather_agent::Result<Value>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedModel {
    fn new(responses: Vec<weather_agent::Result<Value>>) -> (Self, Arc<Mutex<Vec<Value>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let model = Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::clone(&requests),
        };
        (model, requests)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat_completion(&self, request: &Value) -> weather_agent::Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::MalformedResponse("script exhausted".into())))
    }
}

fn tool_call_reply(id: &str, name: &str, arguments: Value) -> Value {
    json!({
        "choices": [{ "message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments.to_string() }
            }]
        }}],
        "usage": { "prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25 }
    })
}

fn text_reply(text: &str) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }],
        "usage": { "prompt_tokens": 30, "completion_tokens": 10, "total_tokens": 40 }
    })
}

fn structured_reply(payload: Value) -> Value {
    tool_call_reply("call_structured", "WeatherResponse", payload)
}

fn weather_agent(model: ScriptedModel, config: AgentConfig) -> Agent {
    Agent::with_chat_model(
        model,
        config,
        ToolRegistry::new().with_tool(GetWeatherTool::new()),
    )
}

#[tokio::test]
async fn test_sf_query_calls_tool_then_answers_structured() {
    let (model, requests) = ScriptedModel::new(vec![
        Ok(tool_call_reply("call_1", "get_weather", json!({"city": "sf"}))),
        Ok(text_reply("It is 75 degrees and sunny in SF, with 3 mph winds from the south-east.")),
        Ok(structured_reply(
            json!({"temperature": 75, "wind_direction": "SE", "wind_speed": 4.8}),
        )),
    ]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let result = agent.run("what's the weather in SF?").await.unwrap();

    // user → model (tool call) → tool result → model
    assert_eq!(result.messages.len(), 4);
    assert_eq!(result.messages[0], Message::user("what's the weather in SF?"));
    assert_eq!(result.messages[1].tool_calls()[0].name, "get_weather");
    assert_eq!(result.messages[1].tool_calls()[0].arguments["city"], "sf");
    assert_eq!(
        result.messages[2],
        Message::tool("call_1", "get_weather", get_weather(City::Sf))
    );
    assert!(result.messages[3].is_assistant());
    assert!(result.messages[3].tool_calls().is_empty());

    assert_eq!(result.final_response.wind_direction, "SE");
    assert_eq!(result.final_response.temperature, 75.0);
    assert_eq!(result.iterations, 2);
    assert_eq!(result.tool_call_count(), 1);
    assert_eq!(result.tokens.unwrap().total_tokens, 25 + 40 + 25);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);

    // First call: tool bound, full history
    assert_eq!(requests[0]["tools"][0]["function"]["name"], "get_weather");
    assert_eq!(requests[0]["tool_choice"], "auto");
    assert_eq!(requests[0]["messages"].as_array().unwrap().len(), 1);

    // Second call sees the tool result
    let second = requests[1]["messages"].as_array().unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second[2]["role"], "tool");
    assert_eq!(second[2]["tool_call_id"], "call_1");
    assert_eq!(second[2]["content"], get_weather(City::Sf));

    // Structured call gets only the latest tool result, forced to the schema
    let structured = requests[2]["messages"].as_array().unwrap();
    assert_eq!(structured.len(), 1);
    assert_eq!(structured[0]["role"], "user");
    assert_eq!(structured[0]["content"], get_weather(City::Sf));
    assert_eq!(requests[2]["tool_choice"]["function"]["name"], "WeatherResponse");
}

#[tokio::test]
async fn test_run_without_tool_call_answers_from_original_request() {
    let (model, requests) = ScriptedModel::new(vec![
        Ok(text_reply("I think it is mild.")),
        Ok(structured_reply(
            json!({"temperature": 65.5, "wind_direction": "W", "wind_speed": 10}),
        )),
    ]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let result = agent.run("how windy is it usually?").await.unwrap();

    assert_eq!(result.messages.len(), 2);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.tool_call_count(), 0);
    assert_eq!(result.final_response.wind_direction, "W");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["messages"][0]["content"], "how windy is it usually?");
}

#[tokio::test]
async fn test_unknown_city_is_fatal() {
    let (model, requests) = ScriptedModel::new(vec![Ok(tool_call_reply(
        "call_1",
        "get_weather",
        json!({"city": "la"}),
    ))]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let err = agent.run("what's the weather in LA?").await.unwrap_err();

    assert!(matches!(err, AgentError::UnknownCity(ref city) if city == "la"));
    // No recovery call after the failed tool
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unregistered_tool_is_fatal() {
    let (model, _requests) = ScriptedModel::new(vec![Ok(tool_call_reply(
        "call_1",
        "get_forecast",
        json!({"city": "sf"}),
    ))]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let err = agent.run("forecast for SF?").await.unwrap_err();
    assert!(matches!(err, AgentError::ToolNotFound(ref name) if name == "get_forecast"));
}

#[tokio::test]
async fn test_model_failure_is_not_retried() {
    let (model, requests) = ScriptedModel::new(vec![
        Err(AgentError::Api {
            status: 401,
            message: "Invalid API Key".into(),
        }),
        Ok(text_reply("unreachable")),
    ]);
    let agent = weather_agent(model, AgentConfig::new(""));

    let err = agent.run("what's the weather in SF?").await.unwrap_err();

    assert!(matches!(err, AgentError::Api { status: 401, .. }));
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tool_loop_is_bounded() {
    let (model, requests) = ScriptedModel::new(vec![
        Ok(tool_call_reply("call_1", "get_weather", json!({"city": "sf"}))),
        Ok(tool_call_reply("call_2", "get_weather", json!({"city": "nyc"}))),
        Ok(tool_call_reply("call_3", "get_weather", json!({"city": "sf"}))),
    ]);
    let agent = weather_agent(model, AgentConfig::new("test-key").with_max_iterations(2));

    let err = agent.run("keep checking").await.unwrap_err();

    assert!(matches!(err, AgentError::MaxIterations(2)));
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_schema_violation_fails_run() {
    let (model, _requests) = ScriptedModel::new(vec![
        Ok(text_reply("Sunny.")),
        Ok(structured_reply(json!({"temperature": 75, "wind_direction": "SE"}))),
    ]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let err = agent.run("what's the weather in SF?").await.unwrap_err();
    assert!(matches!(err, AgentError::Validation(ref msg) if msg.contains("wind_speed")));
}

#[tokio::test]
async fn test_json_schema_method_reads_content() {
    let (model, requests) = ScriptedModel::new(vec![
        Ok(tool_call_reply("call_1", "get_weather", json!({"city": "nyc"}))),
        Ok(text_reply("Cloudy in NYC.")),
        Ok(text_reply(
            r#"{"temperature": 70, "wind_direction": "NE", "wind_speed": 8.05}"#,
        )),
    ]);
    let config =
        AgentConfig::new("test-key").with_structured_method(StructuredOutputMethod::JsonSchema);
    let agent = weather_agent(model, config);

    let result = agent.run("what's the weather in NYC?").await.unwrap();

    assert_eq!(result.final_response.wind_direction, "NE");
    assert_eq!(result.structured["temperature"], 70);

    let requests = requests.lock().unwrap();
    assert_eq!(requests[2]["response_format"]["type"], "json_schema");
    assert_eq!(requests[2]["messages"][0]["content"], get_weather(City::Nyc));
}

#[tokio::test]
async fn test_every_tool_call_in_a_reply_is_executed_in_order() {
    let reply = json!({
        "choices": [{ "message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [
                { "id": "a", "type": "function",
                  "function": { "name": "get_weather", "arguments": "{\"city\":\"nyc\"}" } },
                { "id": "b", "type": "function",
                  "function": { "name": "get_weather", "arguments": "{\"city\":\"sf\"}" } }
            ]
        }}]
    });
    let (model, _requests) = ScriptedModel::new(vec![
        Ok(reply),
        Ok(text_reply("NYC is cloudy, SF is sunny.")),
        Ok(structured_reply(
            json!({"temperature": 75, "wind_direction": "SE", "wind_speed": 4.8}),
        )),
    ]);
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let result = agent.run("compare NYC and SF").await.unwrap();

    assert_eq!(result.tool_result_count(), 2);
    assert_eq!(result.messages[2], Message::tool("a", "get_weather", get_weather(City::Nyc)));
    assert_eq!(result.messages[3], Message::tool("b", "get_weather", get_weather(City::Sf)));
}

#[tokio::test]
async fn test_empty_history_is_rejected() {
    let (model, requests) = ScriptedModel::new(Vec::new());
    let agent = weather_agent(model, AgentConfig::new("test-key"));

    let err = agent
        .invoke_with_messages::<weather_agent::WeatherResponse>(Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::ConversationState(_)));
    assert!(requests.lock().unwrap().is_empty());
}
