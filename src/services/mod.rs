pub(crate) mod execution;
pub mod openai_client;
pub(crate) mod response_parser;
pub(crate) mod structured;
