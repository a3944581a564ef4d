pub mod auth;
pub mod init;
pub mod play;
pub mod playlist;
pub mod session;
pub mod utils;
