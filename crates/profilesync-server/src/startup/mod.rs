//! Application startup: logging and wiring of the store, the network-server
//! client and the synchronization service.

mod context;
mod logging;

pub use context::{AppContext, open_store, run_migrations};
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, ROOT_LOG_FILE, init_logging};
