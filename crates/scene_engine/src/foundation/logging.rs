//! Logging setup
//!
//! The library only emits records through the `log` facade. Hosts call
//! [`init`] once at startup to install `env_logger`.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Install `env_logger`
///
/// `RUST_LOG` wins when set; otherwise records at `level` and above are
/// printed. Calling this twice is harmless, the second call is ignored.
pub fn init(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.is_test(cfg!(test)).try_init();
}

/// Parse a level name such as `"info"` or `"debug"`
///
/// Unknown names fall back to `Info` with a warning.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.parse() {
        Ok(level) => level,
        Err(_) => {
            log::warn!("Unknown log level '{}', using info", name);
            LevelFilter::Info
        }
    }
}
