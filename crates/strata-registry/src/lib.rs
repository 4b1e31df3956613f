mod cache;
mod config;
mod error;
mod service;

pub use cache::{CacheKey, CachedSchema, SchemaCache};
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use service::{EntityRequest, SchemaRegistry};
