//! CLI command handlers. Each command is in its own file.

mod config;
mod run;
mod url;

pub use config::run_show_config;
pub use run::{run_download, RunArgs};
pub use url::run_url;
