// Service exports
pub mod auth;
pub mod cache;
pub mod postgres;
pub mod store;

pub use auth::{AuthError, Claims, TokenVerifier};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use postgres::PostgresClient;
pub use store::{InMemoryProfileStore, ProfileStore, StoreError};
