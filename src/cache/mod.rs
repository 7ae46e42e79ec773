pub mod cache_traits;
pub mod concurrent;
pub mod lru;
