// Service exports
pub mod auth;
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use auth::{AuthError, Claims, StaticSession, TokenSession, TokenVerifier};
pub use cache::{CacheError, CacheKey, CacheManager, CachedProfileStore};
pub use memory::{InMemoryMatchRepository, InMemoryProfileStore};
pub use postgres::{PostgresError, PostgresMatchRepository};
pub use store::{MatchRepository, ProfileStore, SessionProvider};
pub use supabase::{SupabaseClient, SupabaseError};
