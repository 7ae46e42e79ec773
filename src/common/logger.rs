use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs the process logger with the cache module held at `Warn`.
pub fn initialize_logger() {
    initialize_logger_with_cache_level(LevelFilter::Warn);
}

/// Like [`initialize_logger`], but lets the caller open up `lrukit::cache`
/// (`Debug` shows construction, eviction and clear). `RUST_LOG` still wins.
pub fn initialize_logger_with_cache_level(cache_level: LevelFilter) {
    // Use call_once_force to recover if an earlier initialization attempt panicked.
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("lrukit", LevelFilter::Info)
            .filter_module("lrukit::cache", cache_level)
            .filter_module("rustyline", LevelFilter::Warn)
            .format_timestamp_millis()
            .parse_default_env();

        // Avoid panicking if the logger was already initialized elsewhere.
        let _ = builder.try_init();
    });
}
