// Service exports
pub mod cache;
pub mod llm;
pub mod postgres;

pub use cache::{CacheManager, CacheKey, CacheError, CacheStats};
pub use llm::{LlmClient, LlmError};
pub use postgres::{PostgresClient, PostgresError};
