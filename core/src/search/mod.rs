pub mod aggregator;
pub mod brave;
pub mod duckduckgo;
pub mod fetch;
pub mod hybrid;
pub mod normalize;
pub mod summarize;

pub use aggregator::{DEFAULT_MAX_URLS, ScrapedPage, SearchAggregator, SearchOutcome};
pub use brave::BraveSearchProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use fetch::{HttpPageFetcher, extract_paragraph_text};
pub use hybrid::{HybridSearch, NO_CONTENT_REPLY, NO_RESULTS_REPLY};
pub use normalize::normalize_url;
pub use summarize::Summarizer;
