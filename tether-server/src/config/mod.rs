mod relay_config;

pub use relay_config::*;
