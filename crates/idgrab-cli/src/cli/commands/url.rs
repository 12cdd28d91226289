//! `idgrab url` – show the request URL for one ID.

use anyhow::Result;
use idgrab_core::config::FetchConfig;
use idgrab_core::endpoint::Endpoint;

pub fn run_url(cfg: &FetchConfig, id: u64) -> Result<i32> {
    let endpoint = Endpoint::new(&cfg.base_url, &cfg.route)?;
    println!("{}", endpoint.url_for(id));
    Ok(0)
}
