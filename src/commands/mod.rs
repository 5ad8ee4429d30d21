pub mod keygen_command;
pub mod settle_command;

pub use self::{keygen_command::*, settle_command::*};

use tracing_subscriber::EnvFilter;

/// Installs the global log subscriber. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
