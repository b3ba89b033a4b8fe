mod schema;
mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore};
