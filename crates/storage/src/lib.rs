#![forbid(unsafe_code)]

mod mapping;
pub mod progress;
pub mod repository;
pub mod sqlite;

pub use progress::{PROFILE_KEY, ProgressStore, ROUND_STATE_KEY};
pub use repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
