//! SQLite-backed persistence.

pub mod pool;
pub mod turns;

pub use pool::DatabasePool;
pub use turns::SqliteConversationStore;
