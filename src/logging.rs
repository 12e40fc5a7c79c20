use log::LevelFilter;

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Initializes `env_logger`.
///
/// `RUST_LOG` wins when set. Otherwise this crate logs at debug in debug
/// builds and info in release, and everything else only at warn.
pub fn setup_logger() {
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter(None, LevelFilter::Warn);
        builder.filter(Some(CRATE_TARGET), default_level());
    }

    builder.format_timestamp_millis();
    // a second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info }
}
