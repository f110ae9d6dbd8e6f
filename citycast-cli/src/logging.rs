use tracing_subscriber::EnvFilter;

/// Log to stderr so forecast output on stdout stays clean.
///
/// `RUST_LOG` wins over `--verbose` when set.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("warn,citycast={level},citycast_core={level}")
}
