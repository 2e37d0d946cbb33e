use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the `backdrop` binary.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `info,backdrop=debug`,
/// or `debug` everywhere when `verbose` is set.
///
/// # Arguments
///
/// * `verbose` - Raise the default level to debug
/// * `json` - Emit JSON lines instead of human-readable text
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if verbose { "debug" } else { "info,backdrop=debug" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    debug!(verbose, json, "Telemetry initialized");
    Ok(())
}
