use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults if nothing was
/// initialized yet.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration from `config.toml` in the
/// current directory (if present) and `AFF__*` environment variables.
///
/// # Examples
/// ```no_run
/// use affiliates::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    init_config_from(None);
}

/// Initialize the global configuration from an explicit file path.
pub fn init_config_from(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Atomically replace the configuration with a modified copy.
pub fn update_config<F>(f: F)
where
    F: FnOnce(&mut StaticConfig),
{
    let swap = CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()));
    let mut next = (*swap.load_full()).clone();
    f(&mut next);
    swap.store(Arc::new(next));
}
