//! The closed set of tools the model may call.

use crate::error::AgentError;
use crate::traits::ToolSpec;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    CoinInfo,
    CoinInfoCmc,
    BraveSearch,
    DuckDuckGoSearch,
    RunCode,
    DateTime,
}

struct ToolEntry {
    tool: ToolName,
    name: &'static str,
    description: &'static str,
    /// Single required string argument and its description.
    argument: Option<(&'static str, &'static str)>,
}

const SEARCH_DESCRIPTION: &str =
    "Run a hybrid search using both Brave and DuckDuckGo, scrape pages, and summarize results.";

const TOOL_TABLE: &[ToolEntry] = &[
    ToolEntry {
        tool: ToolName::CoinInfo,
        name: "get_coin_info",
        description: "Fetch the live price and market data for a cryptocurrency using CoinGecko.",
        argument: Some(("query", "Name or symbol of the cryptocurrency.")),
    },
    ToolEntry {
        tool: ToolName::CoinInfoCmc,
        name: "get_coin_info_cmc",
        description: "Fetch live market data from CoinMarketCap for a cryptocurrency \
                      (fallback or alternative source).",
        argument: Some(("query", "Name or symbol of the coin.")),
    },
    ToolEntry {
        tool: ToolName::BraveSearch,
        name: "brave_search_tool",
        description: SEARCH_DESCRIPTION,
        argument: Some(("query", "What the user wants to search for.")),
    },
    ToolEntry {
        tool: ToolName::DuckDuckGoSearch,
        name: "perform_duckduckgo_search",
        description: SEARCH_DESCRIPTION,
        argument: Some(("query", "Search term or question.")),
    },
    ToolEntry {
        tool: ToolName::RunCode,
        name: "run_code_snippet",
        description: "Execute a Python code snippet and return the output.",
        argument: Some(("message", "Python code prefixed with 'run code:'.")),
    },
    ToolEntry {
        tool: ToolName::DateTime,
        name: "get_datetime_info",
        description: "Get the current system date and time in human-readable format.",
        argument: None,
    },
];

impl ToolName {
    fn entry(self) -> &'static ToolEntry {
        TOOL_TABLE
            .iter()
            .find(|entry| entry.tool == self)
            .unwrap_or(&TOOL_TABLE[0])
    }

    pub fn from_name(name: &str) -> Option<Self> {
        TOOL_TABLE
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.tool)
    }

    pub fn as_str(self) -> &'static str {
        self.entry().name
    }

    pub fn required_argument(self) -> Option<&'static str> {
        self.entry().argument.map(|(name, _)| name)
    }

    pub fn spec(self) -> ToolSpec {
        let entry = self.entry();
        let parameters_schema = match entry.argument {
            Some((name, description)) => json!({
                "type": "object",
                "properties": {
                    name: {"type": "string", "description": description}
                },
                "required": [name]
            }),
            None => json!({"type": "object", "properties": {}}),
        };

        ToolSpec {
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            parameters_schema,
        }
    }
}

/// Declarations for every tool, in table order.
pub fn tool_specs() -> Vec<ToolSpec> {
    TOOL_TABLE.iter().map(|entry| entry.tool.spec()).collect()
}

/// Parses the model's JSON argument text. An empty string means no
/// arguments.
pub fn parse_arguments(tool: ToolName, raw: &str) -> Result<Value, AgentError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|source| AgentError::MalformedArguments {
        tool: tool.as_str().to_string(),
        source,
    })
}

/// The tool's required string argument, if it declares one.
pub fn required_argument(tool: ToolName, args: &Value) -> Result<String, AgentError> {
    let name = tool.required_argument().unwrap_or_default();
    crate::tools::extract_string_arg(args, name).ok_or_else(|| AgentError::MissingArgument {
        tool: tool.as_str().to_string(),
        argument: name.to_string(),
    })
}

pub fn unknown_tool_reply(name: &str) -> String {
    format!(
        "Sorry, I tried to use a tool I don't have ({name}), so I couldn't finish that. \
         Could you rephrase the request?"
    )
}
