pub mod app_config;
pub mod parse;
pub mod paths;

pub use app_config::{AppConfig, DefaultsConfig, EmulatorConfig, ParserProfile};
pub use parse::parse_config_content;

/// Commented starter configuration written by `vmlaunch config init`.
pub const CONFIG_TEMPLATE: &str = include_str!("../../assets/vmlaunch.toml");
