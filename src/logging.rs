use std::io::Write;

/// Initializes `env_logger` for the binaries.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init() {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .target(env_logger::Target::Stderr);
    // A second call (e.g. from tests) keeps the first logger.
    let _ = builder.try_init();
}
