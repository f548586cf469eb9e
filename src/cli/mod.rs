use crate::{Agent, AgentConfig, StructuredOutputMethod};
use clap::{Arg, Command};
use tracing::{error, info};

const DEFAULT_QUERY: &str = "what's the weather in SF?";

fn command() -> Command {
    Command::new("weather-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ask an LLM about the weather and get a structured answer back")
        .arg(
            Arg::new("query")
                .help("The question to send to the agent")
                .default_value(DEFAULT_QUERY)
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model name (or set GROQ_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("API key (or set GROQ_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("OpenAI-compatible base URL (or set GROQ_BASE_URL)"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .help("Maximum tool-bound model calls [default: 25]")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("structured-method")
                .short('s')
                .long("structured-method")
                .value_name("METHOD")
                .help("How the final answer is coerced: function_calling or json_schema")
                .default_value(StructuredOutputMethod::default().as_str()),
        )
}

/// CLI entry point for the weather-agent binary
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = command().get_matches();

    // Environment first (including .env), flags override.
    let mut config = AgentConfig::from_env();
    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config.api_key = api_key.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.as_str());
    }
    if let Some(max_iterations) = matches.get_one::<usize>("max-iterations") {
        config = config.with_max_iterations(*max_iterations);
    }
    if let Some(method) = matches.get_one::<String>("structured-method") {
        config = config.with_structured_method(method.parse()?);
    }

    let query = matches
        .get_one::<String>("query")
        .map(String::as_str)
        .unwrap_or(DEFAULT_QUERY);

    info!("Running agent with query: {}", query);
    info!("Using model: {}", config.model);
    info!("Base URL: {}", config.base_url);

    let agent = Agent::weather(config)?;

    match agent.run(query).await {
        Ok(result) => {
            println!("{}", result.trace());
            println!("\n--- Structured Response ---\n{}", result.structured_json());
            info!("Agent execution completed successfully");
        }
        Err(e) => {
            error!(code = e.error_code(), "Agent execution failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
