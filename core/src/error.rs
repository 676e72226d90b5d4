use thiserror::Error;

/// Turn-ending failures a caller may want to tell apart. These travel inside
/// `anyhow::Error`; recover them with `downcast_ref::<AgentError>()`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("malformed arguments for tool '{tool}': {source}")]
    MalformedArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool '{tool}' called without required argument '{argument}'")]
    MissingArgument { tool: String, argument: String },

    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: anyhow::Error,
    },
}
