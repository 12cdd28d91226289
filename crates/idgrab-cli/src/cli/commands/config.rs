//! `idgrab config` – print the effective configuration.

use anyhow::Result;
use idgrab_core::config::FetchConfig;
use std::path::Path;

pub fn run_show_config(cfg: &FetchConfig, source: &Path) -> Result<i32> {
    println!("# {}", source.display());
    print!("{}", cfg.to_toml_string()?);
    Ok(0)
}
