pub mod config;
pub mod errors;
pub mod evaluator;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompts;
pub mod search;
pub mod server;
pub mod state;
pub mod telemetry;
