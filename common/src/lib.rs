pub mod config;
pub mod errors;
pub mod redis;
pub mod util;

pub type UserId = String;
pub type GroupName = String;
