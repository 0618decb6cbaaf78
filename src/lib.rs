pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::JsonStore;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    builder::ScheduleBuilder, engine::SchedulerEngine, request::ScheduleRequest, Schedule,
};
pub use utils::error::{Result, SchedulerError};
