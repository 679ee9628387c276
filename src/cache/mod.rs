pub mod ttl;

mod macros;

pub use ttl::CacheJanitorHandle;
pub use ttl::TtlCache;
pub use ttl::DEFAULT_PURGE_INTERVAL;
