//! Configuration system
//!
//! - `macros`  - `config_struct!` (struct + defaults in one declaration)
//! - `schemas` - every configuration section
//! - `utils`   - loading, env overrides, `with_config`

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    AlertsConfig, Config, DatabaseConfig, PublishConfig, SourceConfig, TelegramConfig,
};
pub use utils::{
    apply_env_overrides, load_config, parse_config, read_config_file,
    set_config, validate_config, with_config, MAX_AVERAGE_WINDOW_DAYS, MAX_RETENTION_DAYS,
};
