//! Log output. The server installs a `tracing-subscriber` stack; the browser
//! build forwards the same events to the console.

#[cfg(feature = "server")]
mod tracing_init;

#[cfg(feature = "server")]
pub use tracing_init::{TracingError, build_env_filter, init_tracing};

/// Route `tracing` events to the browser console.
#[cfg(feature = "wasm")]
pub fn init_browser_logging(config: &crate::config::LoggingConfig) {
    let wasm_config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(config.level.to_tracing_level())
        .build();
    tracing_wasm::set_as_global_default_with_config(wasm_config);
}
