pub mod extract;
pub mod factory;
pub mod in_memory;
pub mod json_file;
pub mod supabase;

pub use extract::{ExtractedFact, extract_fact, has_save_intent, normalize_key};
pub use factory::create_fact_store;
pub use in_memory::InMemoryFactStore;
pub use json_file::JsonFactStore;
pub use supabase::SupabaseFactStore;
