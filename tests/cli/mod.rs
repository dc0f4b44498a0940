//! CLI Integration Test Modules

pub mod run;
pub mod toml_config;
