pub mod alerts;
pub mod apis;
pub mod arguments;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod paths;
pub mod process_lock;
pub mod publish;
pub mod run;
pub mod telegram;
