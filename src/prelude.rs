pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::compress::{Compressor, GzipCompressor, NoopCompressor, ZstdCompressor};
pub use crate::error::CacheError;
pub use crate::policy::EvictionPolicy;
pub use crate::stats::CacheStats;
