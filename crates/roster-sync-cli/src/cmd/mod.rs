pub mod config;
pub mod import;
pub mod init;
pub mod status;
pub mod sync;
