pub mod build;
pub mod config_init;
pub mod list;
pub mod probe;
