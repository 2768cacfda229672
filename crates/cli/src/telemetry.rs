use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
