pub mod config;
pub mod response;

pub use config::Configuration;
pub use response::Result;
