pub mod config;
pub mod logging;

pub mod endpoint;
pub mod error;
pub mod head;
pub mod naming;
pub mod pool;
pub mod storage;
pub mod summary;
pub mod worker;

pub use config::FetchConfig;
pub use error::FetchError;
pub use pool::run_pool;
pub use summary::{RunSummary, TaskOutcome};
