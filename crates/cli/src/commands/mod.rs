pub mod complete;
pub mod config_cmd;
pub mod init;
