pub mod config;
pub mod diff;
pub mod init;
pub mod refs;
pub mod sync;
