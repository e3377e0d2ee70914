pub mod artifacts;
pub mod config;
pub mod error;
pub mod flows;
pub mod report;
pub mod scenario;
pub mod scenarios;
pub mod session;
pub mod suite;
pub mod testdata;
pub mod waiter;

// Re-export common items
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use session::{Engine, Session, SessionFactory};
pub use suite::run_suite;
