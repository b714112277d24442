use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Installs the global subscriber. `RUST_LOG` filters (default `info`);
/// `config.log_json` switches from compact lines to JSON records.
pub fn setup_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    if config.log_json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
