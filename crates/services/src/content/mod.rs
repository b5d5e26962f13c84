//! Content-retrieval collaborator: fetching questions from an external
//! provider, repairing what it returns, and falling back to the embedded bank.

mod loader;
mod mapping;
mod provider;

pub use loader::BankLoader;
pub use mapping::{
    GENERIC_DISTRACTORS, MAX_OPTIONS, MIN_OPTIONS, ProviderQuestion, ensure_min_options,
    is_placeholder, map_provider_questions,
};
pub use provider::{ContentConfig, ContentProvider, HttpContentProvider};
