// ABOUTME: Installs the tracing subscriber used by the CLI
// ABOUTME: Compact stderr output filtered at the level chosen on the command line

use crate::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber at `level` (e.g. "debug", "info").
pub fn init(level: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_new(level).map_err(|e| Error::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info, warn};

    #[test]
    fn test_logging_init() {
        // only the first init in a process can succeed
        let _ = init("debug");

        info!("This is an info message");
        warn!("This is a warning message");
        error!("This is an error message");
    }
}
