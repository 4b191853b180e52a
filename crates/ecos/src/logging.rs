use tracing_subscriber::EnvFilter;

const CRATES: &[&str] = &["ecos", "ecos_config", "ecos_core", "ecos_cloud", "ecos_cloud_aws"];

/// Install the stderr subscriber.
///
/// `--verbose` forces debug. Otherwise `RUST_LOG` wins, then the config's
/// `global.log_level`, then `info`.
pub fn init(verbose: bool, config_level: Option<&str>) {
    let filter = if verbose {
        EnvFilter::new(directives("debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives(config_level.unwrap_or("info"))))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `level` for our crates, `warn` for dependencies.
fn directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}
