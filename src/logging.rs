use crate::types::{DinitzError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a formatting subscriber filtered by `level`
/// (any `EnvFilter` directive, e.g. `"info"` or `"dinitz=debug"`).
///
/// Logs go to stderr so step output on stdout stays machine-readable.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| DinitzError::InvalidArgument(format!("Invalid log level: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| DinitzError::InvalidArgument("Logging already initialized".into()))
}
