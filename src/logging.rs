use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    /// Log lines on stderr so `--json` output on stdout stays clean
    pub to_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            to_stderr: true,
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = Registry::default().with(env_filter);

    let result = if config.to_stderr {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    // Already-installed subscriber is expected in tests and embedded use
    if let Err(e) = result {
        let msg = e.to_string();
        if !msg.contains("already been set") {
            eprintln!("failed to initialize tracing: {e}");
        }
    }
}
