use serde_json::Value;

pub mod code_runner;
pub mod datetime;
pub mod factory;
pub mod market;

pub use code_runner::{LocalProcessRunner, PistonRunner, extract_code};
pub use datetime::{describe_now, describe_time};
pub use factory::{create_code_runner, create_market_sources};
pub use market::{CoinGeckoClient, CoinMarketCapClient, CoinQuote};

pub fn extract_string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
