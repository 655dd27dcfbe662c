use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `-v` raises the default level; `RUST_LOG` still wins when set.
pub(crate) fn default_log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

pub(crate) fn init_tracing(verbosity: u8) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_log_level(verbosity).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
