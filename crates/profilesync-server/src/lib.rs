//! profilesync operator command line
//!
//! Loads configuration, initializes logging, opens the local store selected by
//! `persistence.mode` and drives the service-profile synchronization service.

pub mod cli;
pub mod command;
pub mod model;
pub mod startup;

pub use cli::{Cli, Command};
pub use command::{CommandError, ProfileInput, execute};
pub use model::Configuration;
