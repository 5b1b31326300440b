mod logging;
mod token_config;

pub use logging::LoggingConfig;
pub use token_config::{JACARTA_CONF_ENV, TokenConfig};
