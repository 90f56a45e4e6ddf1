use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log target of the line that discloses a token value when no `--output`
/// is given. [`filter`] keeps it enabled at INFO whatever the level.
pub const SECRET_TARGET: &str = "gltm::secret";

/// `RUST_LOG` wins over `level`; the secret target is always added on top.
pub fn filter(level: &str) -> EnvFilter {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));
    match format!("{SECRET_TARGET}=info").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Install the stderr log subscriber.
pub fn init(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
