pub mod config_cmd;
pub mod log_cmd;
pub mod metadata;
pub mod split;
