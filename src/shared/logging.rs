use log::info;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system.
/// Safe to call more than once; only the first call takes effect.
pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("roster", log::LevelFilter::Debug) // More verbose for our crate
            .filter_module("diesel", log::LevelFilter::Warn) // Reduce diesel noise
            .format_timestamp_secs()
            .format_target(false)
            .format_module_path(false)
            .try_init()
            .ok();

        info!("Logging system initialized");
    });
}
