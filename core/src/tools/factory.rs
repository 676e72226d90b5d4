use crate::config::{Config, RunnerKind, resolve_secret};
use crate::tools::{CoinGeckoClient, CoinMarketCapClient, LocalProcessRunner, PistonRunner};
use crate::traits::{CodeRunner, MarketData};
use std::sync::Arc;
use std::time::Duration;

/// Primary and fallback market-data sources.
pub fn create_market_sources(config: &Config) -> (Arc<dyn MarketData>, Arc<dyn MarketData>) {
    let cmc_key = resolve_secret(
        &["COINMARKETCAP_API_KEY", "CMC_API_KEY"],
        config.market.coinmarketcap_api_key.as_deref(),
    );
    (
        Arc::new(CoinGeckoClient::new(&config.market.vs_currency)),
        Arc::new(CoinMarketCapClient::new(cmc_key, &config.market.vs_currency)),
    )
}

pub fn create_code_runner(config: &Config) -> Arc<dyn CodeRunner> {
    let timeout = Duration::from_secs(config.code.timeout_secs);
    match config.code.runner {
        RunnerKind::Piston => Arc::new(PistonRunner::new(
            &config.code.piston_url,
            &config.code.language,
            timeout,
        )),
        RunnerKind::Local => {
            let interpreter = match config.code.language.as_str() {
                "python" => "python3",
                other => other,
            };
            Arc::new(LocalProcessRunner::new(interpreter, timeout))
        }
    }
}
